use std::sync::Arc;

use refgate_db::repositories::ChannelRepository;
use tracing::{debug, warn};

use crate::gateway::Gateway;

/// Requires membership in every allowlisted channel. Any lookup error counts as "not subscribed".
#[derive(Clone)]
pub struct SubscriptionGate {
    channels: ChannelRepository,
    gateway: Arc<dyn Gateway>,
}

impl SubscriptionGate {
    pub fn new(channels: ChannelRepository, gateway: Arc<dyn Gateway>) -> Self {
        Self { channels, gateway }
    }

    pub async fn is_satisfied(&self, user_id: i64) -> bool {
        let handles = match self.channels.handles().await {
            Ok(handles) => handles,
            Err(e) => {
                warn!("Failed to load channel allowlist for user {}: {:#}", user_id, e);
                return false;
            }
        };

        // No channels configured means no gate.
        for handle in &handles {
            match self.gateway.membership(handle, user_id).await {
                Ok(status) if status.is_subscribed() => {}
                Ok(status) => {
                    debug!("User {} is not a member of {} ({:?})", user_id, handle, status);
                    return false;
                }
                Err(e) => {
                    warn!("Failed to check subscription of user {} to {}: {}", user_id, handle, e);
                    return false;
                }
            }
        }
        true
    }
}
