//! Project relationship database operations
//!
//! Parent/child hierarchy links between project slugs. Created once,
//! never updated.

use anyhow::Result;
use sqlx::SqlitePool;

/// Check whether a parent/child relationship exists
pub async fn relationship_exists(pool: &SqlitePool, parent: &str, child: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM project_relationships WHERE parent_slug = ? AND child_slug = ?",
    )
    .bind(parent)
    .bind(child)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Insert a parent/child relationship
pub async fn insert_relationship(pool: &SqlitePool, parent: &str, child: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO project_relationships (parent_slug, child_slug, created_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(parent)
    .bind(child)
    .execute(pool)
    .await?;

    Ok(())
}

/// Total number of persisted relationships
pub async fn count_relationships(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project_relationships")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
