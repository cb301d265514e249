//! Code example storage
//!
//! Examples key on their URL and come from two sources: guide pages and
//! repository listings.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

/// Stored code example record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExample {
    pub url: String,
    pub project_slug: Option<String>,
    pub title: String,
    /// "guide" or "repository"
    pub source: String,
    pub description: Option<String>,
}

/// Load example by URL
pub async fn load_example(pool: &SqlitePool, url: &str) -> Result<Option<CodeExample>> {
    let row = sqlx::query(
        "SELECT url, project_slug, title, source, description FROM code_examples WHERE url = ?",
    )
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| CodeExample {
        url: row.get("url"),
        project_slug: row.get("project_slug"),
        title: row.get("title"),
        source: row.get("source"),
        description: row.get("description"),
    }))
}

/// Insert or update a code example
pub async fn upsert_example(pool: &SqlitePool, example: &CodeExample) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO code_examples (url, project_slug, title, source, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(url) DO UPDATE SET
            project_slug = excluded.project_slug,
            title = excluded.title,
            source = excluded.source,
            description = excluded.description,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&example.url)
    .bind(&example.project_slug)
    .bind(&example.title)
    .bind(&example.source)
    .bind(&example.description)
    .execute(pool)
    .await?;

    Ok(())
}

/// Total number of stored examples
pub async fn count_examples(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM code_examples")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
