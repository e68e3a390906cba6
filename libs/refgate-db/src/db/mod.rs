use anyhow::{Context, Result};
use sqlx::SqlitePool;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://bot_db.sqlite3";

pub async fn init_db_at(database_url: &str) -> Result<SqlitePool> {
    if !database_url.starts_with("sqlite:") {
        return Err(anyhow::anyhow!(
            "DATABASE_URL must start with sqlite:// (got {})",
            database_url
        ));
    }

    let pool = crate::connect(database_url)
        .await
        .context("Failed to initialise database")?;

    tracing::info!("Database ready at {}", database_url);
    Ok(pool)
}
