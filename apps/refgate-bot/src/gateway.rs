use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, Recipient, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Member,
    Left,
    Banned,
}

impl MemberStatus {
    pub fn is_subscribed(self) -> bool {
        self == MemberStatus::Member
    }
}

impl From<&ChatMemberKind> for MemberStatus {
    fn from(kind: &ChatMemberKind) -> Self {
        if kind.is_banned() {
            MemberStatus::Banned
        } else if kind.is_left() {
            MemberStatus::Left
        } else {
            // Owners, admins, members and restricted members all count.
            MemberStatus::Member
        }
    }
}

/// Outbound calls the services make against the messaging platform.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn membership(&self, channel: &str, user_id: i64) -> Result<MemberStatus>;

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[async_trait]
impl Gateway for Bot {
    async fn membership(&self, channel: &str, user_id: i64) -> Result<MemberStatus> {
        let member = self
            .get_chat_member(
                Recipient::ChannelUsername(channel.to_string()),
                UserId(user_id as u64),
            )
            .await?;
        Ok(MemberStatus::from(&member.kind))
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}
