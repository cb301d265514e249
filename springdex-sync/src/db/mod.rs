//! Database access for springdex-sync
//!
//! SQLite via sqlx. The pipeline treats this layer as a keyed store:
//! find-by-natural-key, save, exists-by-natural-key per table.

pub mod compatibility;
pub mod content;
pub mod examples;
pub mod projects;
pub mod relationships;
pub mod schema;
pub mod versions;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    schema::initialize_schema(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    schema::initialize_schema(&pool)
        .await
        .expect("Schema initialization failed");

    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_pool_creates_file_and_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("nested").join("springdex.db");

        let pool = init_database_pool(&db_path).await.expect("pool init");

        // Schema is queryable
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&pool)
            .await
            .expect("projects table exists");
        assert_eq!(count, 0);
        assert!(db_path.exists());
    }
}
