use teloxide::prelude::*;
use teloxide::types::{KeyboardRemove, ParseMode};
use tracing::info;

use super::HandlerResult;
use crate::AppState;
use crate::bot::commands::{AdminCommand, split_command};
use crate::bot::handlers::{admin, contact};
use crate::bot::keyboards::{MENU_BUTTON, main_menu, menu_trigger, phone_request, subscribe_keyboard};
use crate::bot::messages;
use crate::services::registration_service::RegistrationState;

pub async fn message_handler(bot: Bot, msg: Message, state: AppState) -> HandlerResult {
    let sender_id = msg
        .from
        .as_ref()
        .map(|u| u.id.0 as i64)
        .unwrap_or(msg.chat.id.0);

    if let Some(shared) = msg.contact() {
        return contact::contact_handler(bot, &msg, sender_id, shared, state).await;
    }

    let Some(text) = msg.text() else {
        return default_handler(bot, &msg, sender_id, state).await;
    };

    if let Some((name, args)) = split_command(text) {
        if name == "start" {
            return start_handler(bot, &msg, sender_id, args, state).await;
        }
        if let Some(parsed) = AdminCommand::parse(name, args) {
            return admin::admin_handler(bot, &msg, sender_id, parsed, state).await;
        }
    }

    if text.trim() == MENU_BUTTON {
        return menu_handler(bot, &msg, sender_id, state).await;
    }

    default_handler(bot, &msg, sender_id, state).await
}

async fn start_handler(
    bot: Bot,
    msg: &Message,
    sender_id: i64,
    args: &str,
    state: AppState,
) -> HandlerResult {
    info!("User {} executed /start {:?}", sender_id, args);
    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());
    let outcome = state.registration.start(sender_id, username, args).await?;
    let display_name = outcome.user.display_name();

    bot.send_message(msg.chat.id, messages::welcome(&display_name))
        .parse_mode(ParseMode::Html)
        .await?;

    send_state_prompt(&bot, msg.chat.id, outcome.state, &display_name, sender_id, &state).await
}

/// Follow-up message for the user's current registration step.
pub async fn send_state_prompt(
    bot: &Bot,
    chat_id: ChatId,
    registration_state: RegistrationState,
    display_name: &str,
    user_id: i64,
    state: &AppState,
) -> HandlerResult {
    match registration_state {
        RegistrationState::AwaitingSubscription => {
            let channels = state.channels.list().await?;
            bot.send_message(chat_id, messages::SUBSCRIBE_PROMPT)
                .parse_mode(ParseMode::Html)
                .reply_markup(subscribe_keyboard(&channels))
                .await?;
        }
        RegistrationState::AwaitingPhone => {
            bot.send_message(chat_id, messages::PHONE_PROMPT)
                .parse_mode(ParseMode::Html)
                .reply_markup(phone_request())
                .await?;
        }
        RegistrationState::Registered => {
            let link = state.config.referral_link(user_id);
            bot.send_message(chat_id, messages::registered(display_name, &link))
                .parse_mode(ParseMode::Html)
                .reply_markup(menu_trigger())
                .await?;
        }
    }
    Ok(())
}

async fn menu_handler(bot: Bot, msg: &Message, sender_id: i64, state: AppState) -> HandlerResult {
    if state.registration.registered_user(sender_id).await?.is_none() {
        bot.send_message(msg.chat.id, messages::NOT_REGISTERED)
            .reply_markup(KeyboardRemove::new())
            .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, messages::MAIN_MENU)
        .parse_mode(ParseMode::Html)
        .reply_markup(main_menu())
        .await?;
    Ok(())
}

async fn default_handler(bot: Bot, msg: &Message, sender_id: i64, state: AppState) -> HandlerResult {
    if state.registration.registered_user(sender_id).await?.is_none() {
        bot.send_message(msg.chat.id, messages::NOT_REGISTERED)
            .reply_markup(KeyboardRemove::new())
            .await?;
    } else {
        bot.send_message(msg.chat.id, messages::UNKNOWN_COMMAND)
            .parse_mode(ParseMode::Html)
            .reply_markup(menu_trigger())
            .await?;
    }
    Ok(())
}
