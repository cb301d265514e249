//! Schema initialization for springdex-sync tables
//!
//! Every table keys on natural identity: project slug, (project, version)
//! pair, link endpoint pairs. The sync pipeline only ever creates or
//! updates rows; nothing here is deleted by the pipeline.

use anyhow::Result;
use sqlx::SqlitePool;

/// Create all tables if they don't exist
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            slug TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            homepage_url TEXT NOT NULL,
            repository_url TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS versions (
            guid TEXT PRIMARY KEY,
            project_slug TEXT NOT NULL REFERENCES projects(slug),
            version TEXT NOT NULL,
            major INTEGER NOT NULL,
            minor INTEGER NOT NULL,
            patch INTEGER,
            state TEXT NOT NULL,
            is_latest INTEGER NOT NULL DEFAULT 0,
            is_default INTEGER NOT NULL DEFAULT 0,
            release_date TEXT,
            oss_support_end TEXT,
            enterprise_support_end TEXT,
            ref_doc_url TEXT,
            api_doc_url TEXT,
            status TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(project_slug, version)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_versions_project_generation
        ON versions(project_slug, major, minor)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS compatibility_links (
            anchor_guid TEXT NOT NULL REFERENCES versions(guid),
            target_guid TEXT NOT NULL REFERENCES versions(guid),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(anchor_guid, target_guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_relationships (
            parent_slug TEXT NOT NULL REFERENCES projects(slug),
            child_slug TEXT NOT NULL REFERENCES projects(slug),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(parent_slug, child_slug)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doc_pages (
            project_slug TEXT NOT NULL REFERENCES projects(slug),
            url TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            content TEXT NOT NULL,
            fetched_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(project_slug, url)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS code_examples (
            url TEXT PRIMARY KEY,
            project_slug TEXT,
            title TEXT NOT NULL,
            source TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("Database schema initialized");

    Ok(())
}
