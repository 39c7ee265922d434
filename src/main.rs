use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::coingecko::CoinGeckoClient;
use config::Config;

struct Handler;

struct AppConfig;

impl TypeMapKey for AppConfig {
    type Value = Config;
}

struct MarketData;

impl TypeMapKey for MarketData {
    type Value = Arc<CoinGeckoClient>;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("rocket_chart=debug".parse().expect("valid directive"))
                .add_directive("serenity=warn".parse().expect("valid directive")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("🚀 Starting chart bot...");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!(
        "Charting '{}' in {} (days: {}, scale: {})",
        config.coin_id, config.vs_currency, config.ohlc_days, config.scale_factor
    );
    if config.cg_key.is_none() {
        warn!("CG_KEY not set, using the keyless CoinGecko API");
    }

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<MarketData>(Arc::new(CoinGeckoClient::new(config.cg_key.clone())));
        data.insert::<AppConfig>(config);
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
