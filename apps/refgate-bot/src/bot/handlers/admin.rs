use refgate_db::models::channel::AddChannelOutcome;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{info, warn};

use super::HandlerResult;
use crate::AppState;
use crate::bot::commands::{AdminCommand, AdminCommandError};
use crate::bot::messages;
use crate::bot::utils::{MESSAGE_LIMIT, chunk_lines};
use crate::services::admin_service::RandomPick;

pub async fn admin_handler(
    bot: Bot,
    msg: &Message,
    sender_id: i64,
    parsed: Result<AdminCommand, AdminCommandError>,
    state: AppState,
) -> HandlerResult {
    if !state.config.is_admin(sender_id) {
        warn!("User {} tried to run an admin command", sender_id);
        bot.send_message(msg.chat.id, messages::ADMIN_ONLY).await?;
        return Ok(());
    }

    let command = match parsed {
        Ok(command) => command,
        Err(e) => {
            info!("Rejected admin command: {}", e);
            let text = match &e {
                AdminCommandError::InvalidHandle { .. } => {
                    format!("{}\n{}", messages::INVALID_HANDLE, messages::usage(e.usage()))
                }
                _ => messages::usage(e.usage()),
            };
            reply(&bot, msg, text).await?;
            return Ok(());
        }
    };

    info!("Admin {} runs {:?}", sender_id, command);
    let admin = &state.admin_service;
    match command {
        AdminCommand::AddChannel(handle) => {
            let text = match admin.add_channel(&handle).await? {
                AddChannelOutcome::Added => messages::channel_added(&handle),
                AddChannelOutcome::AlreadyExists => messages::channel_exists(&handle),
            };
            reply(&bot, msg, text).await?;
        }
        AdminCommand::RemoveChannel(handle) => {
            let text = if admin.remove_channel(&handle).await? {
                messages::channel_removed(&handle)
            } else {
                messages::channel_missing(&handle)
            };
            reply(&bot, msg, text).await?;
        }
        AdminCommand::Channels => {
            let channels = admin.channels().await?;
            reply(&bot, msg, messages::channel_list(&channels)).await?;
        }
        AdminCommand::Random(n) => {
            let text = match admin.pick_random(n).await? {
                RandomPick::Chosen(users) => messages::random_pick(&users),
                RandomPick::NotEnough { available, .. } => messages::not_enough_users(available),
            };
            reply(&bot, msg, text).await?;
        }
        AdminCommand::AllUsers => {
            let users = admin.all_users().await?;
            if users.is_empty() {
                reply(&bot, msg, messages::NO_USERS.to_string()).await?;
                return Ok(());
            }
            for chunk in chunk_lines(messages::user_lines(&users), MESSAGE_LIMIT) {
                reply(&bot, msg, chunk).await?;
            }
        }
        AdminCommand::Stats => {
            let stats = admin.stats().await?;
            reply(&bot, msg, messages::stats(&stats)).await?;
        }
        AdminCommand::Broadcast(text) => {
            let report = admin.broadcast(&text).await?;
            let summary = if report.sent + report.failed == 0 {
                messages::NO_USERS.to_string()
            } else {
                messages::broadcast_report(&report)
            };
            reply(&bot, msg, summary).await?;
        }
    }
    Ok(())
}

async fn reply(bot: &Bot, msg: &Message, text: String) -> HandlerResult {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
