use serenity::all::{CreateActionRow, CreateAttachment, CreateButton, CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::config::Config;
use crate::models::ChartConfig;
use crate::services::{chart_service, scale_service, summary_service};

/// `$chart [coin_id]`: candlestick chart plus price summary
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    tracing::info!("🚀 Chart command received from user {} with args: {:?}", msg.author.id, args);

    let (config, client) = {
        let data = ctx.data.read().await;
        let config = data
            .get::<crate::AppConfig>()
            .ok_or("Configuration not initialized".to_string())?
            .clone();
        let client = data
            .get::<crate::MarketData>()
            .ok_or("Market data client not initialized".to_string())?
            .clone();
        (config, client)
    };

    let coin_id = resolve_coin_id(args, &config.coin_id);

    if let Err(e) = msg.channel_id.broadcast_typing(&ctx.http).await {
        tracing::warn!("Failed to broadcast typing: {}", e);
    }

    tracing::info!("Fetching OHLC and summary for {}", coin_id);
    let (ohlc, summary) = tokio::join!(
        client.fetch_ohlc(&coin_id, &config.vs_currency, &config.ohlc_days),
        client.fetch_summary(&coin_id, &config.vs_currency),
    );
    let ohlc = ohlc.map_err(|e| {
        tracing::error!("OHLC fetch failed for {}: {}", coin_id, e);
        format!("Failed to fetch price history for '{}': {}", coin_id, e)
    })?;
    let summary = summary.map_err(|e| {
        tracing::error!("Summary fetch failed for {}: {}", coin_id, e);
        format!("Failed to fetch market summary for '{}': {}", coin_id, e)
    })?;

    let series: Vec<_> = ohlc.into_iter().skip(config.ohlc_skip).collect();
    tracing::info!("✓ {} candles after skipping {}", series.len(), config.ohlc_skip);

    let scaled = scale_service::scale_series(&series, config.scale_factor).map_err(|e| e.to_string())?;
    let chart_config = chart_config_for(&config);

    // Rasterising is CPU bound; each request gets its own canvas on a blocking thread
    let image = tokio::task::spawn_blocking(move || chart_service::render_chart(&scaled, chart_config))
        .await
        .map_err(|e| format!("Chart task failed: {}", e))?
        .map_err(|e| {
            tracing::error!("Chart generation error: {}", e);
            format!("Chart generation failed: {}", e)
        })?;
    tracing::info!("✓ Chart generated: {}x{}, {} bytes", image.width, image.height, image.as_bytes().len());

    let filename = format!("chart_{}.png", coin_id);
    let embed = CreateEmbed::default()
        .title(format!("🚀 {}", coin_id))
        .description(summary_service::format_caption(&summary))
        .image(format!("attachment://{}", filename))
        .color(0x1ecd1e);

    let mut message = CreateMessage::default()
        .embed(embed)
        .add_file(CreateAttachment::bytes(image.into_bytes(), filename));

    let buttons: Vec<CreateButton> = link_targets(&config)
        .into_iter()
        .map(|(label, url)| CreateButton::new_link(url).label(label))
        .collect();
    if !buttons.is_empty() {
        message = message.components(vec![CreateActionRow::Buttons(buttons)]);
    }

    msg.channel_id
        .send_message(ctx, message)
        .await
        .map_err(|e| {
            tracing::error!("Failed to send chart: {}", e);
            format!("Failed to send chart: {}", e)
        })?;

    tracing::info!("✓ Chart message sent for {}", coin_id);
    Ok(())
}

fn resolve_coin_id(args: &[&str], default: &str) -> String {
    args.first()
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn chart_config_for(config: &Config) -> ChartConfig {
    ChartConfig::default()
        .with_title("")
        .with_labels("Time", "Mcap")
        .with_glyph_style(config.glyph_style)
        .with_candle_width(config.candle_width)
        .with_utc_offset(config.utc_offset)
}

/// Label/URL pairs for the buttons under the chart
fn link_targets(config: &Config) -> Vec<(&'static str, String)> {
    let mut targets = Vec::new();
    if let Some(url) = &config.website_url {
        targets.push(("🔗 Website", url.clone()));
    }
    if let Some(url) = &config.buy_url {
        targets.push(("🛒 Buy", url.clone()));
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| {
            if name == "DISCORD_TOKEN" {
                return Some("token".to_string());
            }
            pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_resolve_coin_id() {
        assert_eq!(resolve_coin_id(&[], "degenerative-sitcom"), "degenerative-sitcom");
        assert_eq!(resolve_coin_id(&["Bitcoin"], "degenerative-sitcom"), "bitcoin");
    }

    #[test]
    fn test_link_targets() {
        assert!(link_targets(&config(&[])).is_empty());

        let targets = link_targets(&config(&[
            ("WEBSITE_URL", "https://example.org/"),
            ("BUY_URL", "https://example.org/buy"),
        ]));
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0], ("🔗 Website", "https://example.org/".to_string()));
        assert_eq!(targets[1].0, "🛒 Buy");
    }

    #[test]
    fn test_chart_config_for() {
        let chart_config = chart_config_for(&config(&[("CHART_UTC_OFFSET", "2")]));
        assert_eq!(chart_config.title, "");
        assert_eq!(chart_config.x_label, "Time");
        assert_eq!(chart_config.y_label, "Mcap");
        assert_eq!(chart_config.utc_offset.local_minus_utc(), 7200);
        assert_eq!(chart_config.candle_width, 0.4);
    }
}
