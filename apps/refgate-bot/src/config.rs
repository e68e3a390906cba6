use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_DATABASE_URL: &str = refgate_db::db::DEFAULT_DATABASE_URL;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub admin_id: i64,
    /// Public handle without `@`; filled from `getMe` when not configured.
    pub bot_username: Option<String>,
    pub database_url: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = non_empty("BOT_TOKEN")
            .or_else(|| non_empty("API_TOKEN"))
            .context("BOT_TOKEN is not set")?;

        let admin_raw = non_empty("ADMIN_ID").context("ADMIN_ID is not set")?;
        let admin_id = admin_raw
            .trim()
            .parse::<i64>()
            .with_context(|| format!("ADMIN_ID must be an integer, got {:?}", admin_raw))?;

        let bot_username =
            non_empty("BOT_USERNAME").map(|u| u.trim().trim_start_matches('@').to_string());

        let database_url =
            non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            token,
            admin_id,
            bot_username,
            database_url,
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.admin_id
    }

    pub fn referral_link(&self, user_id: i64) -> String {
        format!(
            "https://t.me/{}?start={}",
            self.bot_username.as_deref().unwrap_or("bot"),
            user_id
        )
    }
}
