use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Prefix every stored handle carries.
pub const CHANNEL_MARKER: char = '@';

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    pub handle: String,
}

impl Channel {
    /// Public link to the channel, used for "subscribe" buttons.
    pub fn url(&self) -> String {
        format!("https://t.me/{}", self.handle.trim_start_matches(CHANNEL_MARKER))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("channel handle is empty")]
    Empty,
    #[error("channel handle {0:?} contains whitespace")]
    Whitespace(String),
}

/// Trims the input and makes sure it starts with exactly one `@`.
pub fn canonical_handle(raw: &str) -> Result<String, HandleError> {
    let trimmed = raw.trim();
    let bare = trimmed.trim_start_matches(CHANNEL_MARKER);
    if bare.is_empty() {
        return Err(HandleError::Empty);
    }
    if bare.chars().any(char::is_whitespace) {
        return Err(HandleError::Whitespace(trimmed.to_string()));
    }
    Ok(format!("{}{}", CHANNEL_MARKER, bare))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddChannelOutcome {
    Added,
    AlreadyExists,
}
