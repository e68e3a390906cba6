use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::channel::{AddChannelOutcome, Channel, canonical_handle};

#[derive(Debug, Clone)]
pub struct ChannelRepository {
    pool: SqlitePool,
}

impl ChannelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, raw_handle: &str) -> Result<AddChannelOutcome> {
        let handle = canonical_handle(raw_handle)?;
        let inserted = sqlx::query("INSERT INTO channels (handle) VALUES ($1) ON CONFLICT(handle) DO NOTHING")
            .bind(&handle)
            .execute(&self.pool)
            .await
            .context("Failed to add channel")?
            .rows_affected();

        if inserted == 0 {
            return Ok(AddChannelOutcome::AlreadyExists);
        }
        tracing::info!("Channel {} added to allowlist", handle);
        Ok(AddChannelOutcome::Added)
    }

    /// Returns whether a row was removed; removing an unknown handle is a no-op.
    pub async fn remove(&self, raw_handle: &str) -> Result<bool> {
        let handle = canonical_handle(raw_handle)?;
        let removed = sqlx::query("DELETE FROM channels WHERE handle = $1")
            .bind(&handle)
            .execute(&self.pool)
            .await
            .context("Failed to remove channel")?
            .rows_affected();
        if removed > 0 {
            tracing::info!("Channel {} removed from allowlist", handle);
        }
        Ok(removed > 0)
    }

    pub async fn list(&self) -> Result<Vec<Channel>> {
        sqlx::query_as::<_, Channel>("SELECT id, handle FROM channels ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list channels")
    }

    pub async fn handles(&self) -> Result<Vec<String>> {
        Ok(self.list().await?.into_iter().map(|c| c.handle).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM channels")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count channels")
    }
}
