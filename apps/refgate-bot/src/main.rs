use std::sync::Arc;

use dotenvy::dotenv;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod bot;
mod config;
mod gateway;
mod services;
mod state;

use crate::config::BotConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting referral bot...");

    let config = BotConfig::from_env()?;
    let pool = refgate_db::db::init_db_at(&config.database_url).await?;

    let bot = Bot::new(config.token.clone());
    let state = AppState::new(config, pool, Arc::new(bot.clone()));

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            // Keep the sender alive so the dispatcher is not stopped by a closed channel.
            std::future::pending::<()>().await;
        }
        let _ = shutdown_tx.send(());
    });

    bot::run_bot(bot, shutdown_rx, state).await;
    info!("Referral bot stopped");
    Ok(())
}
