use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Chart Bot Help")
        .description("Rocket-style candlestick charts with live market data.")
        .color(0x00b0f4)
        .field(
            "📊 Charts",
            "`$chart` - Chart the default coin\n`$chart <coin id>` - Chart any CoinGecko coin id",
            false,
        )
        .field("🎯 General", "`$help` - Show this help message", false)
        .field(
            "⚡ Rate Limiting",
            format!(
                "{}-second cooldown per command per user\nGlobal 50 requests/second limit",
                crate::utils::get_cooldown_seconds()
            ),
            false,
        );

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
