use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::user::{User, UserTotals};

const USER_COLUMNS: &str =
    "user_id, username, phone, referral_score, pending_referrer_id, joined_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a zero-score record unless one exists. Returns `true` when a row was inserted.
    pub async fn upsert_if_absent(&self, user_id: i64, username: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, username, referral_score, joined_at)
            VALUES ($1, $2, 0, $3)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to upsert user")?;

        let created = result.rows_affected() > 0;
        if created {
            tracing::info!("New user {} stored", user_id);
        }
        Ok(created)
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")
    }

    pub async fn set_phone(&self, user_id: i64, phone: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET phone = $1 WHERE user_id = $2")
            .bind(phone)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to update phone")?;
        Ok(())
    }

    pub async fn get_phone(&self, user_id: i64) -> Result<Option<String>> {
        let phone: Option<Option<String>> =
            sqlx::query_scalar("SELECT phone FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch phone")?;
        Ok(phone.flatten())
    }

    /// Score of an unknown user is 0.
    pub async fn get_score(&self, user_id: i64) -> Result<i64> {
        let score: Option<i64> =
            sqlx::query_scalar("SELECT referral_score FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch referral score")?;
        Ok(score.unwrap_or(0))
    }

    /// Last writer wins.
    pub async fn set_pending_referrer(&self, user_id: i64, referrer_id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET pending_referrer_id = $1 WHERE user_id = $2")
            .bind(referrer_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to store pending referrer")?;
        Ok(())
    }

    pub async fn pending_referrer(&self, user_id: i64) -> Result<Option<i64>> {
        let pending: Option<Option<i64>> =
            sqlx::query_scalar("SELECT pending_referrer_id FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch pending referrer")?;
        Ok(pending.flatten())
    }

    /// Highest score first; equal scores keep insertion order.
    pub async fn top_by_score(&self, limit: i64) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY referral_score DESC, seq ASC LIMIT $1",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch leaderboard")
    }

    /// 1-based leaderboard position, ordered like [`Self::top_by_score`].
    pub async fn rank_of(&self, user_id: i64) -> Result<Option<i64>> {
        let me: Option<(i64, i64)> =
            sqlx::query_as("SELECT seq, referral_score FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch user for ranking")?;

        let Some((seq, score)) = me else {
            return Ok(None);
        };

        let ahead: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE referral_score > $1 OR (referral_score = $2 AND seq < $3)
            "#,
        )
        .bind(score)
        .bind(score)
        .bind(seq)
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute rank")?;

        Ok(Some(ahead + 1))
    }

    pub async fn all(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY user_id", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch all users")
    }

    pub async fn all_ids(&self) -> Result<Vec<i64>> {
        sqlx::query_scalar("SELECT user_id FROM users ORDER BY user_id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch user ids")
    }

    pub async fn registered(&self) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE phone IS NOT NULL ORDER BY user_id",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch registered users")
    }

    pub async fn totals(&self) -> Result<UserTotals> {
        let (total, registered): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(phone) FROM users",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count users")?;
        Ok(UserTotals { total, registered })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    async fn repo() -> UserRepository {
        UserRepository::new(connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn upsert_if_absent_is_idempotent() {
        let users = repo().await;
        assert!(users.upsert_if_absent(100, Some("first")).await.unwrap());
        assert!(!users.upsert_if_absent(100, Some("second")).await.unwrap());

        let user = users.get(100).await.unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("first"));
        assert_eq!(user.referral_score, 0);
        assert_eq!(user.phone, None);
        assert_eq!(user.pending_referrer_id, None);
    }

    #[tokio::test]
    async fn phone_can_be_set_overwritten_and_cleared() {
        let users = repo().await;
        users.upsert_if_absent(7, None).await.unwrap();
        assert_eq!(users.get_phone(7).await.unwrap(), None);

        users.set_phone(7, Some("+100")).await.unwrap();
        users.set_phone(7, Some("+200")).await.unwrap();
        assert_eq!(users.get_phone(7).await.unwrap().as_deref(), Some("+200"));

        users.set_phone(7, None).await.unwrap();
        assert_eq!(users.get_phone(7).await.unwrap(), None);
        assert_eq!(users.get_phone(8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn pending_referrer_is_last_writer_wins() {
        let users = repo().await;
        users.upsert_if_absent(5, None).await.unwrap();
        users.set_pending_referrer(5, 1).await.unwrap();
        users.set_pending_referrer(5, 2).await.unwrap();
        assert_eq!(users.pending_referrer(5).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn top_by_score_breaks_ties_by_insertion_order() {
        let pool = connect_in_memory().await.unwrap();
        let users = UserRepository::new(pool.clone());
        for id in [30, 10, 20, 40] {
            users.upsert_if_absent(id, None).await.unwrap();
        }
        sqlx::query("UPDATE users SET referral_score = 3 WHERE user_id IN (20, 40)")
            .execute(&pool)
            .await
            .unwrap();

        let top: Vec<i64> = users
            .top_by_score(10)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.user_id)
            .collect();
        assert_eq!(top, vec![20, 40, 30, 10]);

        assert_eq!(users.rank_of(20).await.unwrap(), Some(1));
        assert_eq!(users.rank_of(40).await.unwrap(), Some(2));
        assert_eq!(users.rank_of(10).await.unwrap(), Some(4));
        assert_eq!(users.rank_of(99).await.unwrap(), None);

        let limited = users.top_by_score(2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn all_is_ordered_by_id_and_totals_count_phones() {
        let users = repo().await;
        for id in [3, 1, 2] {
            users.upsert_if_absent(id, None).await.unwrap();
        }
        users.set_phone(2, Some("+2")).await.unwrap();

        let ids: Vec<i64> = users.all().await.unwrap().into_iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(users.all_ids().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(users.registered().await.unwrap().len(), 1);
        assert_eq!(users.totals().await.unwrap(), UserTotals { total: 3, registered: 1 });
        assert_eq!(users.get_score(3).await.unwrap(), 0);
        assert_eq!(users.get_score(404).await.unwrap(), 0);
    }
}
