use refgate_db::models::channel::Channel;
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

pub const MENU_BUTTON: &str = "📋 Menu";

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("🔗 Referral link", "get_ref"),
            InlineKeyboardButton::callback("📊 My stats", "my_refs"),
        ],
        vec![
            InlineKeyboardButton::callback("🏆 Top 10", "top_refs"),
            InlineKeyboardButton::callback("ℹ️ Help", "help"),
        ],
    ])
}

/// Persistent reply keyboard that opens [`main_menu`].
pub fn menu_trigger() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(MENU_BUTTON)]]).resize_keyboard()
}

pub fn phone_request() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new("📱 Share phone number").request(ButtonRequest::Contact),
    ]])
    .resize_keyboard()
    .one_time_keyboard()
}

/// One link button per required channel, then the "check" button.
pub fn subscribe_keyboard(channels: &[Channel]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = channels
        .iter()
        .filter_map(|channel| {
            let url = url::Url::parse(&channel.url()).ok()?;
            Some(vec![InlineKeyboardButton::url(
                format!("📢 Subscribe to {}", channel.handle),
                url,
            )])
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "✅ Check subscription",
        "check_sub",
    )]);
    InlineKeyboardMarkup::new(rows)
}
