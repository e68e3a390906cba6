//! Outgoing texts. Everything interpolated from user data goes through `escape`.

use refgate_db::models::channel::Channel;
use refgate_db::models::user::User;
use teloxide::utils::html::escape;

use crate::services::admin_service::{BotStats, BroadcastReport};

pub const NEW_REFERRAL_NOTICE: &str = "🎉 New referral!\n\n\
    Someone joined with your link and your score went up by 1 🚀\n\n\
    Open the menu to see your stats.";

pub const SUBSCRIBE_PROMPT: &str = "🔗 <b>First, subscribe to the channels below:</b>\n\n\
    Then press <b>✅ Check subscription</b>.";

pub const NOT_SUBSCRIBED_ALERT: &str =
    "❌ You are not subscribed to every channel yet. Subscribe and try again.";

pub const SUBSCRIPTION_CONFIRMED: &str = "✅ Subscription confirmed!";

pub const PHONE_PROMPT: &str = "📞 <b>Please share your phone number.</b>\n\n\
    It is required to register and use the referral program.\n\n\
    🔒 Your number is only visible to the administrators.";

pub const FOREIGN_CONTACT: &str = "🚫 Please share your own phone number.";

pub const SUBSCRIBE_BEFORE_CONTACT: &str = "🚫 Subscribe to the channels first.\n\n\
    After subscribing, send /start again.";

pub const PHONE_UPDATED: &str = "📱 Your phone number has been updated ✅";

pub const NOT_REGISTERED: &str = "🚫 You are not registered yet!\n\n\
    Press /start and complete registration 😊";

pub const PHONE_FIRST_ALERT: &str = "🚫 Share your phone number first!";

pub const UNKNOWN_COMMAND: &str = "🤖 <b>Unknown command.</b>\n\n\
    Use the menu button to open the main menu.";

pub const MAIN_MENU: &str = "🚀 <b>Main menu:</b>";

pub const EMPTY_LEADERBOARD_ALERT: &str = "❌ Nobody has been referred yet!";

pub const HELP: &str = "ℹ️ <b>Help</b>\n\n\
    Invite friends with your personal link and collect points 😎\n\n\
    1️⃣ <b>Registration</b>\n\
    • press /start\n\
    • subscribe to the required channels\n\
    • share your phone number\n\n\
    2️⃣ <b>Referrals</b>\n\
    • get your personal link\n\
    • share it with friends\n\
    • earn points when they register\n\n\
    3️⃣ <b>Points</b>\n\
    • direct invite: +1\n\
    • second-level invite: +1\n\n\
    🎯 Collect points and climb the leaderboard!";

pub const ADMIN_ONLY: &str = "🔐 Administrators only!";

pub fn welcome(display_name: &str) -> String {
    format!(
        "🎉 <b>Welcome, {}!</b> 🎉\n\n\
        Invite your friends through this bot and collect points 😎\n\n\
        📋 <b>Steps:</b>\n\
        1️⃣ Subscribe to the channels\n\
        2️⃣ Share your phone number\n\
        3️⃣ Share your referral link with friends!",
        escape(display_name)
    )
}

pub fn registered(display_name: &str, link: &str) -> String {
    format!(
        "🎉 <b>Congratulations, {}!</b>\n\n\
        ✅ You are registered.\n\n\
        🔗 <b>Your referral link:</b>\n<code>{}</code>\n\n\
        📋 <b>How it works</b>\n\
        • share the link with friends\n\
        • you get +1 point when they register\n\
        • and +1 when their invitees register\n\n\
        🏆 Collect more points and win prizes!",
        escape(display_name),
        escape(link)
    )
}

pub fn referral_link(display_name: &str, link: &str, score: i64) -> String {
    format!(
        "🔗 <b>{}, your referral link:</b>\n\n\
        <code>{}</code>\n\n\
        📊 <b>Current points:</b> {}\n\n\
        💡 Share it in chats and social networks to climb the leaderboard! 🏆",
        escape(display_name),
        escape(link),
        score
    )
}

pub fn my_stats(display_name: &str, score: i64, rank: Option<i64>) -> String {
    let rank_line = match rank {
        Some(rank) => format!("🏅 <b>Your place:</b> #{}", rank),
        None => "🏅 <b>Your place:</b> not ranked".to_string(),
    };
    format!(
        "📊 <b>{} - your stats:</b>\n\n\
        👥 <b>Points:</b> {}\n\
        {}\n\n\
        • direct and second-level invites both count\n\
        • every registered invitee is +1\n\n\
        🎯 <b>Next goal:</b> {} points",
        escape(display_name),
        score,
        rank_line,
        next_goal(score)
    )
}

pub fn next_goal(score: i64) -> i64 {
    (score + 5).max(10)
}

pub fn leaderboard(top: &[User]) -> String {
    const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];
    let mut msg = String::from("🏆 <b>Top 10 referrers:</b>\n\n");
    for (idx, user) in top.iter().enumerate() {
        let place = MEDALS
            .get(idx)
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{}.", idx + 1));
        msg.push_str(&format!(
            "{} {} — <b>{} pts</b>\n",
            place,
            escape(&user.display_name()),
            user.referral_score
        ));
    }
    msg.push_str("\n💡 Invite more friends to move up!");
    msg
}

pub fn channel_added(handle: &str) -> String {
    format!("✅ Channel <code>{}</code> added.", escape(handle))
}

pub fn channel_exists(handle: &str) -> String {
    format!("⚠️ Channel <code>{}</code> is already in the list.", escape(handle))
}

pub fn channel_removed(handle: &str) -> String {
    format!("🗑️ Channel <code>{}</code> removed.", escape(handle))
}

pub fn channel_missing(handle: &str) -> String {
    format!("ℹ️ Channel <code>{}</code> was not in the list.", escape(handle))
}

pub fn channel_list(channels: &[Channel]) -> String {
    if channels.is_empty() {
        return "📋 The channel list is empty.".to_string();
    }
    let mut msg = String::from("📋 <b>Required channels:</b>\n\n");
    for (idx, channel) in channels.iter().enumerate() {
        msg.push_str(&format!("{}. <code>{}</code>\n", idx + 1, escape(&channel.handle)));
    }
    msg
}

pub const INVALID_HANDLE: &str = "❌ That is not a valid channel handle.";

pub fn usage(usage: &str) -> String {
    format!("📥 Usage: <code>{}</code>", escape(usage))
}

pub fn not_enough_users(available: usize) -> String {
    format!("⚠️ Only {} registered users are available.", available)
}

pub fn random_pick(chosen: &[User]) -> String {
    let mut msg = format!("🎲 <b>{} randomly chosen users:</b>\n\n", chosen.len());
    for (idx, user) in chosen.iter().enumerate() {
        msg.push_str(&format!(
            "{}. {} (ID: {})\n",
            idx + 1,
            escape(&user.display_name()),
            user.user_id
        ));
    }
    msg
}

/// One line per user; the caller splits them into messages.
pub fn user_lines(users: &[User]) -> Vec<String> {
    let mut lines = vec!["📋 <b>All users:</b>\n".to_string()];
    lines.extend(users.iter().map(|user| {
        let status = if user.is_registered() { "✅" } else { "❌" };
        format!(
            "{} {} | 🏆 {} pts",
            status,
            escape(&user.display_name()),
            user.referral_score
        )
    }));
    lines
}

pub const NO_USERS: &str = "📋 There are no users yet.";

pub fn stats(stats: &BotStats) -> String {
    format!(
        "📊 <b>Bot statistics:</b>\n\n\
        👥 <b>Users:</b> {}\n\
        ✅ <b>Registered:</b> {}\n\
        🔗 <b>Referrals:</b> {}\n\
        📢 <b>Channels:</b> {}\n\n\
        📈 <b>Registration rate:</b> {}%",
        stats.total_users,
        stats.registered_users,
        stats.total_referrals,
        stats.total_channels,
        stats.registration_rate()
    )
}

pub fn broadcast_report(report: &BroadcastReport) -> String {
    format!(
        "📢 Broadcast finished!\n\n✅ Delivered: {}\n❌ Failed: {}",
        report.sent, report.failed
    )
}
