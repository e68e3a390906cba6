use teloxide::prelude::*;
use teloxide::types::{Contact, KeyboardRemove, ParseMode};

use super::HandlerResult;
use crate::AppState;
use crate::bot::keyboards::menu_trigger;
use crate::bot::messages;
use crate::services::registration_service::{ContactOutcome, ContactShare};

pub async fn contact_handler(
    bot: Bot,
    msg: &Message,
    sender_id: i64,
    shared: &Contact,
    state: AppState,
) -> HandlerResult {
    let share = ContactShare {
        owner_id: shared.user_id.map(|id| id.0 as i64),
        phone_number: shared.phone_number.clone(),
    };

    match state.registration.submit_contact(sender_id, share).await? {
        ContactOutcome::ForeignContact => {
            bot.send_message(msg.chat.id, messages::FOREIGN_CONTACT).await?;
        }
        ContactOutcome::NotSubscribed => {
            bot.send_message(msg.chat.id, messages::SUBSCRIBE_BEFORE_CONTACT)
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        ContactOutcome::PhoneUpdated => {
            bot.send_message(msg.chat.id, messages::PHONE_UPDATED)
                .reply_markup(menu_trigger())
                .await?;
        }
        ContactOutcome::Registered { .. } => {
            let display_name = state
                .users
                .get(sender_id)
                .await?
                .map(|u| u.display_name())
                .unwrap_or_else(|| format!("ID: {}", sender_id));
            let link = state.config.referral_link(sender_id);
            bot.send_message(msg.chat.id, messages::registered(&display_name, &link))
                .parse_mode(ParseMode::Html)
                .reply_markup(menu_trigger())
                .await?;
        }
    }
    Ok(())
}
