use std::sync::Arc;

use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::{dptree, prelude::*, types::Update};
use tracing::{error, info};

use crate::config::BotConfig;

pub mod commands;
pub mod handlers;
pub mod keyboards;
pub mod messages;
pub mod utils;

pub async fn run_bot(
    bot: Bot,
    mut shutdown_signal: tokio::sync::broadcast::Receiver<()>,
    mut state: crate::AppState,
) {
    info!("Starting referral bot dispatcher...");

    std::panic::set_hook(Box::new(|info| {
        error!("CRITICAL BOT PANIC: {:?}", info);
    }));

    match bot.get_me().await {
        Ok(me) => {
            let username = me.username.clone().unwrap_or_else(|| "unknown".into());
            info!("Bot connected as: @{}", username);
            if state.config.bot_username.is_none() {
                state.config = Arc::new(BotConfig {
                    bot_username: Some(username),
                    ..(*state.config).clone()
                });
            }
        }
        Err(e) => {
            error!("CRITICAL: Bot failed to connect to Telegram: {}", e);
            return;
        }
    }

    let message_handler = Update::filter_message().endpoint(handlers::command::message_handler);
    let callback_handler =
        Update::filter_callback_query().endpoint(handlers::callback::callback_handler);

    let mut dispatcher = Dispatcher::builder(
        bot,
        dptree::entry().branch(message_handler).branch(callback_handler),
    )
    .dependencies(dptree::deps![state])
    .default_handler(|upd: Arc<Update>| async move {
        info!("Unhandled update: {:?}", upd.id);
    })
    .error_handler(LoggingErrorHandler::with_custom_text(
        "An error has occurred in the update handler",
    ))
    .build();

    tokio::select! {
        _ = dispatcher.dispatch() => {
            info!("Bot dispatcher exited naturally");
        }
        _ = shutdown_signal.recv() => {
            info!("Bot received shutdown signal, stopping...");
        }
    }
}
