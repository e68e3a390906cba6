use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ParseMode};
use tracing::{info, warn};

use super::HandlerResult;
use crate::AppState;
use crate::bot::handlers::command::send_state_prompt;
use crate::bot::keyboards::main_menu;
use crate::bot::messages;
use crate::services::registration_service::RegistrationState;

const LEADERBOARD_SIZE: i64 = 10;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: AppState) -> HandlerResult {
    info!("Received callback: {:?}", q.data);
    let user_id = q.from.id.0 as i64;
    let chat_id = ChatId(user_id);

    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    match data {
        "check_sub" => {
            let registration_state = state.registration.confirm_subscription(user_id).await?;
            if registration_state == RegistrationState::AwaitingSubscription {
                bot.answer_callback_query(q.id.clone())
                    .text(messages::NOT_SUBSCRIBED_ALERT)
                    .show_alert(true)
                    .await?;
                return Ok(());
            }

            bot.answer_callback_query(q.id.clone())
                .text(messages::SUBSCRIPTION_CONFIRMED)
                .await?;
            if let Some(prompt) = &q.message {
                let _ = bot.delete_message(prompt.chat().id, prompt.id()).await;
            }

            let display_name = state
                .users
                .get(user_id)
                .await?
                .map(|u| u.display_name())
                .unwrap_or_else(|| format!("ID: {}", user_id));
            send_state_prompt(&bot, chat_id, registration_state, &display_name, user_id, &state)
                .await?;
        }

        "get_ref" => {
            let Some(user) = state.registration.registered_user(user_id).await? else {
                return alert(&bot, &q, messages::PHONE_FIRST_ALERT).await;
            };
            bot.answer_callback_query(q.id.clone()).await?;
            let link = state.config.referral_link(user_id);
            let text = messages::referral_link(&user.display_name(), &link, user.referral_score);
            show_in_menu(&bot, &q, chat_id, text).await?;
        }

        "my_refs" => {
            let Some(user) = state.registration.registered_user(user_id).await? else {
                return alert(&bot, &q, messages::PHONE_FIRST_ALERT).await;
            };
            bot.answer_callback_query(q.id.clone()).await?;
            let rank = state.users.rank_of(user_id).await?;
            let text = messages::my_stats(&user.display_name(), user.referral_score, rank);
            show_in_menu(&bot, &q, chat_id, text).await?;
        }

        "top_refs" => {
            let top = state.users.top_by_score(LEADERBOARD_SIZE).await?;
            if top.is_empty() {
                return alert(&bot, &q, messages::EMPTY_LEADERBOARD_ALERT).await;
            }
            bot.answer_callback_query(q.id.clone()).await?;
            show_in_menu(&bot, &q, chat_id, messages::leaderboard(&top)).await?;
        }

        "help" => {
            bot.answer_callback_query(q.id.clone()).await?;
            show_in_menu(&bot, &q, chat_id, messages::HELP.to_string()).await?;
        }

        other => {
            warn!("Unknown callback action {:?} from {}", other, user_id);
            bot.answer_callback_query(q.id.clone()).await?;
        }
    }

    Ok(())
}

async fn alert(bot: &Bot, q: &CallbackQuery, text: &str) -> HandlerResult {
    bot.answer_callback_query(q.id.clone())
        .text(text)
        .show_alert(true)
        .await?;
    Ok(())
}

/// Replaces the menu message in place; falls back to a new message when it is gone.
async fn show_in_menu(bot: &Bot, q: &CallbackQuery, chat_id: ChatId, text: String) -> HandlerResult {
    if let Some(menu) = &q.message {
        if let Err(e) = bot
            .edit_message_text(menu.chat().id, menu.id(), text)
            .parse_mode(ParseMode::Html)
            .reply_markup(main_menu())
            .await
        {
            warn!("Failed to edit menu message for {}: {}", chat_id.0, e);
        }
        return Ok(());
    }

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(main_menu())
        .await?;
    Ok(())
}
