use std::sync::Arc;

use anyhow::Result;
use rand::seq::IndexedRandom;
use refgate_db::models::channel::{AddChannelOutcome, Channel};
use refgate_db::models::user::User;
use refgate_db::repositories::{ChannelRepository, ReferralRepository, UserRepository};
use tracing::{info, warn};

use crate::gateway::Gateway;

#[derive(Debug, Clone, PartialEq)]
pub enum RandomPick {
    Chosen(Vec<User>),
    NotEnough { requested: usize, available: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BotStats {
    pub total_users: i64,
    pub registered_users: i64,
    pub total_referrals: i64,
    pub total_channels: i64,
}

impl BotStats {
    /// Share of users with a phone, in percent rounded to one decimal.
    pub fn registration_rate(&self) -> f64 {
        if self.total_users == 0 {
            return 0.0;
        }
        let pct = self.registered_users as f64 / self.total_users as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct AdminService {
    users: UserRepository,
    channels: ChannelRepository,
    referrals: ReferralRepository,
    gateway: Arc<dyn Gateway>,
}

impl AdminService {
    pub fn new(
        users: UserRepository,
        channels: ChannelRepository,
        referrals: ReferralRepository,
        gateway: Arc<dyn Gateway>,
    ) -> Self {
        Self {
            users,
            channels,
            referrals,
            gateway,
        }
    }

    pub async fn add_channel(&self, handle: &str) -> Result<AddChannelOutcome> {
        self.channels.add(handle).await
    }

    pub async fn remove_channel(&self, handle: &str) -> Result<bool> {
        self.channels.remove(handle).await
    }

    pub async fn channels(&self) -> Result<Vec<Channel>> {
        self.channels.list().await
    }

    /// Uniform sample of registered users, without replacement.
    pub async fn pick_random(&self, n: usize) -> Result<RandomPick> {
        let registered = self.users.registered().await?;
        if n > registered.len() {
            return Ok(RandomPick::NotEnough {
                requested: n,
                available: registered.len(),
            });
        }
        let chosen = registered
            .choose_multiple(&mut rand::rng(), n)
            .cloned()
            .collect();
        Ok(RandomPick::Chosen(chosen))
    }

    pub async fn all_users(&self) -> Result<Vec<User>> {
        self.users.all().await
    }

    pub async fn stats(&self) -> Result<BotStats> {
        let totals = self.users.totals().await?;
        Ok(BotStats {
            total_users: totals.total,
            registered_users: totals.registered,
            total_referrals: self.referrals.count().await?,
            total_channels: self.channels.count().await?,
        })
    }

    /// Sends `text` to every known user, one at a time. A failed send is counted and skipped.
    pub async fn broadcast(&self, text: &str) -> Result<BroadcastReport> {
        let recipients = self.users.all_ids().await?;
        let mut report = BroadcastReport::default();

        for user_id in recipients {
            match self.gateway.send_text(user_id, text).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!("Broadcast to {} failed: {}", user_id, e);
                    report.failed += 1;
                }
            }
        }

        info!("Broadcast finished: {} sent, {} failed", report.sent, report.failed);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::FakeGateway;
    use refgate_db::connect_in_memory;
    use std::collections::HashSet;

    async fn service() -> (AdminService, UserRepository, ReferralRepository, Arc<FakeGateway>) {
        let pool = connect_in_memory().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let referrals = ReferralRepository::new(pool.clone());
        let channels = ChannelRepository::new(pool);
        let gateway = Arc::new(FakeGateway::default());
        let admin = AdminService::new(users.clone(), channels, referrals.clone(), gateway.clone());
        (admin, users, referrals, gateway)
    }

    async fn register(users: &UserRepository, ids: &[i64]) {
        for id in ids {
            users.upsert_if_absent(*id, None).await.unwrap();
            users.set_phone(*id, Some("+0")).await.unwrap();
        }
    }

    #[tokio::test]
    async fn add_channel_twice_keeps_one_entry() {
        let (admin, ..) = service().await;
        assert_eq!(admin.add_channel("foo").await.unwrap(), AddChannelOutcome::Added);
        assert_eq!(
            admin.add_channel("foo").await.unwrap(),
            AddChannelOutcome::AlreadyExists
        );
        let handles: Vec<String> = admin
            .channels()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.handle)
            .collect();
        assert_eq!(handles, vec!["@foo"]);
    }

    #[tokio::test]
    async fn random_rejects_more_than_registered() {
        let (admin, users, ..) = service().await;
        register(&users, &[1, 2, 3]).await;
        users.upsert_if_absent(4, None).await.unwrap();

        assert_eq!(
            admin.pick_random(5).await.unwrap(),
            RandomPick::NotEnough {
                requested: 5,
                available: 3
            }
        );
        assert_eq!(
            admin.pick_random(4).await.unwrap(),
            RandomPick::NotEnough {
                requested: 4,
                available: 3
            }
        );
    }

    #[tokio::test]
    async fn random_picks_distinct_registered_users() {
        let (admin, users, ..) = service().await;
        register(&users, &[1, 2, 3, 4, 5]).await;
        users.upsert_if_absent(6, None).await.unwrap();

        let RandomPick::Chosen(chosen) = admin.pick_random(3).await.unwrap() else {
            panic!("expected a selection");
        };
        let ids: HashSet<i64> = chosen.iter().map(|u| u.user_id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| (1..=5).contains(id)));

        let RandomPick::Chosen(all) = admin.pick_random(5).await.unwrap() else {
            panic!("expected a selection");
        };
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn stats_count_every_table() {
        let (admin, users, referrals, _) = service().await;
        assert_eq!(admin.stats().await.unwrap().registration_rate(), 0.0);

        register(&users, &[1]).await;
        users.upsert_if_absent(2, None).await.unwrap();
        users.upsert_if_absent(3, None).await.unwrap();
        referrals.credit(2, 1).await.unwrap();
        admin.add_channel("news").await.unwrap();

        let stats = admin.stats().await.unwrap();
        assert_eq!(
            stats,
            BotStats {
                total_users: 3,
                registered_users: 1,
                total_referrals: 1,
                total_channels: 1,
            }
        );
        assert_eq!(stats.registration_rate(), 33.3);
    }

    #[tokio::test]
    async fn broadcast_counts_successes_and_isolates_failures() {
        let (admin, users, _, gateway) = service().await;
        for id in [1, 2, 3] {
            users.upsert_if_absent(id, None).await.unwrap();
        }
        gateway.unreachable(2);

        let report = admin.broadcast("hello").await.unwrap();
        assert_eq!(report, BroadcastReport { sent: 2, failed: 1 });
        assert_eq!(
            gateway.sent(),
            vec![(1, "hello".to_string()), (3, "hello".to_string())]
        );
    }
}
