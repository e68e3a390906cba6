use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub referral_score: i64,
    pub pending_referrer_id: Option<i64>,
    pub joined_at: DateTime<Utc>,
}

impl User {
    /// A user counts as registered once a phone number is on file.
    pub fn is_registered(&self) -> bool {
        self.phone.is_some()
    }

    /// `@handle`, then `📱 phone`, then the raw id.
    pub fn display_name(&self) -> String {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            format!("@{}", username)
        } else if let Some(phone) = self.phone.as_deref() {
            format!("📱 {}", phone)
        } else {
            format!("ID: {}", self.user_id)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct UserTotals {
    pub total: i64,
    pub registered: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: Option<&str>, phone: Option<&str>) -> User {
        User {
            user_id: 42,
            username: username.map(str::to_string),
            phone: phone.map(str::to_string),
            referral_score: 0,
            pending_referrer_id: None,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_prefers_handle_then_phone_then_id() {
        assert_eq!(user(Some("alice"), Some("+1")).display_name(), "@alice");
        assert_eq!(user(None, Some("+998901234567")).display_name(), "📱 +998901234567");
        assert_eq!(user(Some(""), None).display_name(), "ID: 42");
        assert_eq!(user(None, None).display_name(), "ID: 42");
    }
}
