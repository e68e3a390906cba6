use std::sync::Arc;

use refgate_db::repositories::{ChannelRepository, ReferralRepository, UserRepository};
use refgate_db::sqlx::SqlitePool;

use crate::bot::messages;
use crate::config::BotConfig;
use crate::gateway::Gateway;
use crate::services::admin_service::AdminService;
use crate::services::registration_service::RegistrationService;
use crate::services::subscription_gate::SubscriptionGate;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BotConfig>,
    pub users: UserRepository,
    pub channels: ChannelRepository,
    pub registration: RegistrationService,
    pub admin_service: AdminService,
}

impl AppState {
    pub fn new(config: BotConfig, pool: SqlitePool, gateway: Arc<dyn Gateway>) -> Self {
        let users = UserRepository::new(pool.clone());
        let channels = ChannelRepository::new(pool.clone());
        let referrals = ReferralRepository::new(pool);

        let gate = SubscriptionGate::new(channels.clone(), gateway.clone());
        let registration = RegistrationService::new(
            users.clone(),
            referrals.clone(),
            gate,
            gateway.clone(),
            messages::NEW_REFERRAL_NOTICE,
        );
        let admin_service = AdminService::new(users.clone(), channels.clone(), referrals, gateway);

        Self {
            config: Arc::new(config),
            users,
            channels,
            registration,
            admin_service,
        }
    }
}
