//! Compatibility link database operations
//!
//! Links are pure associative records between two version guids,
//! stored directed (anchor → target). Existence is checked by pair
//! lookup before insert; the pipeline never relies on constraint
//! violations for dedup.

use anyhow::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Check whether a link already exists for the (anchor, target) pair
pub async fn link_exists(pool: &SqlitePool, anchor: Uuid, target: Uuid) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM compatibility_links WHERE anchor_guid = ? AND target_guid = ?",
    )
    .bind(anchor.to_string())
    .bind(target.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Insert a compatibility link
pub async fn insert_link(pool: &SqlitePool, anchor: Uuid, target: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO compatibility_links (anchor_guid, target_guid, created_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(anchor.to_string())
    .bind(target.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Total number of persisted links
pub async fn count_links(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM compatibility_links")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::projects::{insert_project, Project};
    use crate::db::test_pool;
    use crate::db::versions::{insert_version, Version};

    #[tokio::test]
    async fn test_link_lifecycle() {
        let pool = test_pool().await;
        insert_project(&pool, &Project::new("spring-boot", "Spring Boot"))
            .await
            .unwrap();
        insert_project(&pool, &Project::new("spring-data-jpa", "Spring Data JPA"))
            .await
            .unwrap();

        let anchor = Version::new("spring-boot", "3.5.0");
        let target = Version::new("spring-data-jpa", "3.6.0");
        insert_version(&pool, &anchor).await.unwrap();
        insert_version(&pool, &target).await.unwrap();

        assert!(!link_exists(&pool, anchor.guid, target.guid).await.unwrap());

        insert_link(&pool, anchor.guid, target.guid).await.unwrap();

        assert!(link_exists(&pool, anchor.guid, target.guid).await.unwrap());
        assert_eq!(count_links(&pool).await.unwrap(), 1);

        // Direction matters: the reverse pair is a different key
        assert!(!link_exists(&pool, target.guid, anchor.guid).await.unwrap());
    }
}
