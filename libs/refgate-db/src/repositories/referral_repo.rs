use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::referral::{CreditOutcome, MAX_CREDIT_DEPTH, RejectReason};

#[derive(Debug, Clone)]
pub struct ReferralRepository {
    pool: SqlitePool,
}

impl ReferralRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records `referrer_id` as the inviter of `referred_id` and awards one point to
    /// the referrer and to the referrer's own referrer. Nothing is written on rejection.
    pub async fn credit(&self, referred_id: i64, referrer_id: i64) -> Result<CreditOutcome> {
        let mut tx = self.pool.begin().await.context("Failed to begin credit transaction")?;
        let outcome = Self::credit_in_tx(&mut tx, referred_id, referrer_id).await?;
        if outcome.is_accepted() {
            tx.commit().await.context("Failed to commit referral credit")?;
        } else {
            tx.rollback().await.context("Failed to roll back referral credit")?;
        }
        Ok(outcome)
    }

    /// Stores the first phone number of `user_id` and credits their pending referrer, if
    /// any, in one transaction. The pending marker is cleared only when the credit is
    /// accepted. Returns the credited referrer.
    pub async fn complete_registration(&self, user_id: i64, phone: &str) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await.context("Failed to begin registration transaction")?;

        sqlx::query("UPDATE users SET phone = $1 WHERE user_id = $2")
            .bind(phone)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to store phone")?;

        let pending: Option<Option<i64>> =
            sqlx::query_scalar("SELECT pending_referrer_id FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to read pending referrer")?;

        let Some(referrer_id) = pending.flatten() else {
            tx.commit().await.context("Failed to commit registration")?;
            return Ok(None);
        };

        let credited = match Self::credit_in_tx(&mut tx, user_id, referrer_id).await? {
            CreditOutcome::Accepted { credited } => {
                sqlx::query("UPDATE users SET pending_referrer_id = NULL WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to clear pending referrer")?;
                tracing::info!(
                    "Referral {} -> {} credited to {:?}",
                    referrer_id,
                    user_id,
                    credited
                );
                Some(referrer_id)
            }
            CreditOutcome::Rejected(reason) => {
                tracing::debug!(
                    "Pending referral {} -> {} rejected: {:?}",
                    referrer_id,
                    user_id,
                    reason
                );
                None
            }
        };

        tx.commit().await.context("Failed to commit registration")?;
        Ok(credited)
    }

    async fn credit_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        referred_id: i64,
        referrer_id: i64,
    ) -> Result<CreditOutcome> {
        if referred_id == referrer_id {
            return Ok(CreditOutcome::Rejected(RejectReason::SelfReferral));
        }

        // The primary key on referred_id settles concurrent credits: the loser inserts nothing.
        let inserted = sqlx::query(
            r#"
            INSERT INTO referrals (referred_id, referrer_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(referred_id) DO NOTHING
            "#,
        )
        .bind(referred_id)
        .bind(referrer_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .context("Failed to insert referral edge")?
        .rows_affected();

        if inserted == 0 {
            return Ok(CreditOutcome::Rejected(RejectReason::AlreadyReferred));
        }

        let mut credited = Vec::with_capacity(MAX_CREDIT_DEPTH);
        let mut current = Some(referrer_id);
        for _ in 0..MAX_CREDIT_DEPTH {
            let Some(ancestor) = current else {
                break;
            };

            sqlx::query("UPDATE users SET referral_score = referral_score + 1 WHERE user_id = $1")
                .bind(ancestor)
                .execute(&mut **tx)
                .await
                .context("Failed to increment referral score")?;
            credited.push(ancestor);

            current = sqlx::query_scalar("SELECT referrer_id FROM referrals WHERE referred_id = $1")
                .bind(ancestor)
                .fetch_optional(&mut **tx)
                .await
                .context("Failed to walk referral chain")?;
        }

        Ok(CreditOutcome::Accepted { credited })
    }

    pub async fn referrer_of(&self, referred_id: i64) -> Result<Option<i64>> {
        sqlx::query_scalar("SELECT referrer_id FROM referrals WHERE referred_id = $1")
            .bind(referred_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch referrer")
    }

    pub async fn has_referrer(&self, referred_id: i64) -> Result<bool> {
        Ok(self.referrer_of(referred_id).await?.is_some())
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM referrals")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count referrals")
    }
}
