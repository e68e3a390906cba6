use std::sync::Arc;

use anyhow::Result;
use refgate_db::models::user::User;
use refgate_db::repositories::{ReferralRepository, UserRepository};
use tracing::{info, warn};

use crate::gateway::Gateway;
use crate::services::subscription_gate::SubscriptionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    AwaitingSubscription,
    AwaitingPhone,
    Registered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartOutcome {
    pub user: User,
    pub state: RegistrationState,
}

/// Contact card shared by the sender. `owner_id` is absent for contacts that are not
/// linked to an account.
#[derive(Debug, Clone)]
pub struct ContactShare {
    pub owner_id: Option<i64>,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The card belongs to someone else.
    ForeignContact,
    NotSubscribed,
    /// Phone overwritten for an already-registered user; referrals untouched.
    PhoneUpdated,
    Registered { credited_referrer: Option<i64> },
}

/// First token of the `/start` payload, if it is a plain decimal id.
pub fn parse_referrer_arg(raw: &str) -> Option<i64> {
    let token = raw.split_whitespace().next()?;
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[derive(Clone)]
pub struct RegistrationService {
    users: UserRepository,
    referrals: ReferralRepository,
    gate: SubscriptionGate,
    gateway: Arc<dyn Gateway>,
    /// Sent to a referrer when one of their invitees registers.
    referral_notice: &'static str,
}

impl RegistrationService {
    pub fn new(
        users: UserRepository,
        referrals: ReferralRepository,
        gate: SubscriptionGate,
        gateway: Arc<dyn Gateway>,
        referral_notice: &'static str,
    ) -> Self {
        Self {
            users,
            referrals,
            gate,
            gateway,
            referral_notice,
        }
    }

    pub async fn start(
        &self,
        user_id: i64,
        username: Option<&str>,
        raw_args: &str,
    ) -> Result<StartOutcome> {
        self.users.upsert_if_absent(user_id, username).await?;

        if let Some(referrer_id) = parse_referrer_arg(raw_args).filter(|r| *r != user_id) {
            let has_phone = self.users.get_phone(user_id).await?.is_some();
            if !has_phone && !self.referrals.has_referrer(user_id).await? {
                self.users.set_pending_referrer(user_id, referrer_id).await?;
                info!("User {} arrived via referral from {}", user_id, referrer_id);
            }
        }

        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {} not found after upsert", user_id))?;
        let state = self.state_of(&user).await;
        Ok(StartOutcome { user, state })
    }

    /// Re-runs the gate on request; there is no limit on how often a user may ask.
    pub async fn confirm_subscription(&self, user_id: i64) -> Result<RegistrationState> {
        match self.users.get(user_id).await? {
            Some(user) => Ok(self.state_of(&user).await),
            None if self.gate.is_satisfied(user_id).await => Ok(RegistrationState::AwaitingPhone),
            None => Ok(RegistrationState::AwaitingSubscription),
        }
    }

    pub async fn submit_contact(&self, sender_id: i64, contact: ContactShare) -> Result<ContactOutcome> {
        if contact.owner_id != Some(sender_id) {
            warn!("User {} shared a contact that is not their own", sender_id);
            return Ok(ContactOutcome::ForeignContact);
        }

        if !self.gate.is_satisfied(sender_id).await {
            return Ok(ContactOutcome::NotSubscribed);
        }

        self.users.upsert_if_absent(sender_id, None).await?;
        if self.users.get_phone(sender_id).await?.is_some() {
            self.users
                .set_phone(sender_id, Some(contact.phone_number.as_str()))
                .await?;
            info!("User {} updated their phone number", sender_id);
            return Ok(ContactOutcome::PhoneUpdated);
        }

        let credited_referrer = self
            .referrals
            .complete_registration(sender_id, &contact.phone_number)
            .await?;
        info!("User {} completed registration", sender_id);
        if let Some(referrer_id) = credited_referrer {
            let service = self.clone();
            tokio::spawn(async move {
                service.notify_referrer(referrer_id).await;
            });
        }

        Ok(ContactOutcome::Registered { credited_referrer })
    }

    /// Failures are logged and never reach the referred user.
    pub async fn notify_referrer(&self, referrer_id: i64) {
        if let Err(e) = self
            .gateway
            .send_text(referrer_id, self.referral_notice)
            .await
        {
            warn!("Failed to notify referrer {}: {}", referrer_id, e);
        }
    }

    /// The stored record when the user has a phone on file.
    pub async fn registered_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.users.get(user_id).await?.filter(User::is_registered))
    }

    async fn state_of(&self, user: &User) -> RegistrationState {
        if !self.gate.is_satisfied(user.user_id).await {
            RegistrationState::AwaitingSubscription
        } else if user.is_registered() {
            RegistrationState::Registered
        } else {
            RegistrationState::AwaitingPhone
        }
    }
}
