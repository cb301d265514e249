//! Documentation page storage
//!
//! Stores fetched documentation content keyed by (project, url) with a
//! content hash so unchanged pages are recognized without re-storing.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

/// Load the stored content hash for a page, if any
pub async fn load_page_hash(
    pool: &SqlitePool,
    project_slug: &str,
    url: &str,
) -> Result<Option<String>> {
    let row = sqlx::query(
        "SELECT content_hash FROM doc_pages WHERE project_slug = ? AND url = ?",
    )
    .bind(project_slug)
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| row.get("content_hash")))
}

/// Insert or replace a documentation page
pub async fn upsert_page(
    pool: &SqlitePool,
    project_slug: &str,
    url: &str,
    content_hash: &str,
    content: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO doc_pages (project_slug, url, content_hash, content, fetched_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(project_slug, url) DO UPDATE SET
            content_hash = excluded.content_hash,
            content = excluded.content,
            fetched_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(project_slug)
    .bind(url)
    .bind(content_hash)
    .bind(content)
    .execute(pool)
    .await?;

    Ok(())
}
