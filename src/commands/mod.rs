pub mod chart;
pub mod help;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::utils::{check_cooldown, check_global_rate_limit};

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    // Parse command and arguments
    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    if !is_command(command) {
        return;
    }

    if let Err(wait_ms) = check_global_rate_limit().await {
        tracing::warn!("Global rate limit hit, dropping {} ({} ms until a slot frees)", command, wait_ms);
        return;
    }

    if let Err((remaining, should_warn)) = check_cooldown(msg.author.id, command).await {
        tracing::debug!("User {} on cooldown for {} ({}s left)", msg.author.id, command, remaining);
        if should_warn {
            let embed = CreateEmbed::default()
                .title("Command Cooldown")
                .description(format!("⏳ Please wait {} seconds before using this command again.", remaining))
                .color(0xffa500);
            let _ = msg.channel_id.send_message(ctx, CreateMessage::default().embed(embed)).await;
        }
        return;
    }

    let result = match command {
        "$chart" | "$c" => chart::execute(ctx, msg, args).await,
        "$help" => help::execute(ctx, msg).await,
        _ => return,
    };

    if let Err(error_msg) = result {
        tracing::error!("❌ Error executing command {}: {}", command, error_msg);

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message(&error_msg))
            .color(0xff0000);

        let _ = msg.channel_id.send_message(ctx, CreateMessage::default().embed(embed)).await;
    }
}

fn is_command(command: &str) -> bool {
    matches!(command, "$chart" | "$c" | "$help")
}

/// User-facing text for a failed command
fn user_message(error_msg: &str) -> String {
    if error_msg.contains("429") || error_msg.contains("Rate Limited") {
        "⚠️ **Rate Limited**: The market data service is busy. Please try again in a moment.".to_string()
    } else if error_msg.contains("Request failed") || error_msg.contains("HTTP request") {
        "⚠️ **Network Error**: Having trouble reaching the market data service. Please try again.".to_string()
    } else if !error_msg.is_empty() {
        format!("❌ {}", error_msg)
    } else {
        "❌ An error occurred while executing the command.".to_string()
    }
}
