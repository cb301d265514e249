//! Version database operations
//!
//! Versions key on the (project, version string) pair. Numeric
//! components and release state are denormalized at insert time so
//! generation queries (`major.minor`) resolve without re-parsing.

use crate::version::{parse_version, VersionState};
use anyhow::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Version record
#[derive(Debug, Clone)]
pub struct Version {
    pub guid: Uuid,
    pub project_slug: String,
    pub version: String,
    pub major: i64,
    pub minor: i64,
    pub patch: Option<i64>,
    pub state: VersionState,
    pub is_latest: bool,
    pub is_default: bool,
    pub release_date: Option<String>,
    pub oss_support_end: Option<String>,
    pub enterprise_support_end: Option<String>,
    pub ref_doc_url: Option<String>,
    pub api_doc_url: Option<String>,
    pub status: Option<String>,
}

impl Version {
    /// Create a new version record, parsing and classifying the string
    pub fn new(project_slug: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        let parsed = parse_version(&version);
        let state = VersionState::classify(&version, None);

        Self {
            guid: Uuid::new_v4(),
            project_slug: project_slug.into(),
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            state,
            version,
            is_latest: false,
            is_default: false,
            release_date: None,
            oss_support_end: None,
            enterprise_support_end: None,
            ref_doc_url: None,
            api_doc_url: None,
            status: None,
        }
    }
}

fn version_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Version> {
    let guid_str: String = row.get("guid");
    let state_str: String = row.get("state");

    Ok(Version {
        guid: Uuid::parse_str(&guid_str)?,
        project_slug: row.get("project_slug"),
        version: row.get("version"),
        major: row.get("major"),
        minor: row.get("minor"),
        patch: row.get("patch"),
        state: VersionState::from_db(&state_str),
        is_latest: row.get("is_latest"),
        is_default: row.get("is_default"),
        release_date: row.get("release_date"),
        oss_support_end: row.get("oss_support_end"),
        enterprise_support_end: row.get("enterprise_support_end"),
        ref_doc_url: row.get("ref_doc_url"),
        api_doc_url: row.get("api_doc_url"),
        status: row.get("status"),
    })
}

const VERSION_COLUMNS: &str = "guid, project_slug, version, major, minor, patch, state, \
     is_latest, is_default, release_date, oss_support_end, enterprise_support_end, \
     ref_doc_url, api_doc_url, status";

/// Insert a new version
pub async fn insert_version(pool: &SqlitePool, version: &Version) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO versions (
            guid, project_slug, version, major, minor, patch, state,
            is_latest, is_default, release_date, oss_support_end,
            enterprise_support_end, ref_doc_url, api_doc_url, status,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(version.guid.to_string())
    .bind(&version.project_slug)
    .bind(&version.version)
    .bind(version.major)
    .bind(version.minor)
    .bind(version.patch)
    .bind(version.state.as_str())
    .bind(version.is_latest)
    .bind(version.is_default)
    .bind(&version.release_date)
    .bind(&version.oss_support_end)
    .bind(&version.enterprise_support_end)
    .bind(&version.ref_doc_url)
    .bind(&version.api_doc_url)
    .bind(&version.status)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update an existing version's merged fields by guid
pub async fn update_version(pool: &SqlitePool, version: &Version) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE versions
        SET release_date = ?, oss_support_end = ?, enterprise_support_end = ?,
            ref_doc_url = ?, api_doc_url = ?, status = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&version.release_date)
    .bind(&version.oss_support_end)
    .bind(&version.enterprise_support_end)
    .bind(&version.ref_doc_url)
    .bind(&version.api_doc_url)
    .bind(&version.status)
    .bind(version.guid.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load version by (project, version string) natural key
pub async fn load_version(
    pool: &SqlitePool,
    project_slug: &str,
    version: &str,
) -> Result<Option<Version>> {
    let sql =
        format!("SELECT {VERSION_COLUMNS} FROM versions WHERE project_slug = ? AND version = ?");
    let row = sqlx::query(&sql)
        .bind(project_slug)
        .bind(version)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(version_from_row).transpose()
}

/// List a project's versions sharing a major.minor generation
pub async fn list_versions_in_generation(
    pool: &SqlitePool,
    project_slug: &str,
    major: i64,
    minor: i64,
) -> Result<Vec<Version>> {
    let sql = format!(
        "SELECT {VERSION_COLUMNS} FROM versions \
         WHERE project_slug = ? AND major = ? AND minor = ? \
         ORDER BY version"
    );
    let rows = sqlx::query(&sql)
        .bind(project_slug)
        .bind(major)
        .bind(minor)
        .fetch_all(pool)
        .await?;

    rows.iter().map(version_from_row).collect()
}

/// List all versions of a project
pub async fn list_versions(pool: &SqlitePool, project_slug: &str) -> Result<Vec<Version>> {
    let sql = format!("SELECT {VERSION_COLUMNS} FROM versions WHERE project_slug = ? ORDER BY version");
    let rows = sqlx::query(&sql)
        .bind(project_slug)
        .fetch_all(pool)
        .await?;

    rows.iter().map(version_from_row).collect()
}

/// Clear is_latest on every version of a project except the named one.
/// Returns the number of rows cleared.
pub async fn clear_latest_except(
    pool: &SqlitePool,
    project_slug: &str,
    version: &str,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE versions
        SET is_latest = 0, updated_at = CURRENT_TIMESTAMP
        WHERE project_slug = ? AND version != ? AND is_latest = 1
        "#,
    )
    .bind(project_slug)
    .bind(version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Set is_latest on one version. Returns rows affected (0 when it was
/// already latest or does not exist).
pub async fn mark_latest(pool: &SqlitePool, project_slug: &str, version: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE versions
        SET is_latest = 1, updated_at = CURRENT_TIMESTAMP
        WHERE project_slug = ? AND version = ? AND is_latest = 0
        "#,
    )
    .bind(project_slug)
    .bind(version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Clear is_default on every version of a project except the named one
pub async fn clear_default_except(
    pool: &SqlitePool,
    project_slug: &str,
    version: &str,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE versions
        SET is_default = 0, updated_at = CURRENT_TIMESTAMP
        WHERE project_slug = ? AND version != ? AND is_default = 1
        "#,
    )
    .bind(project_slug)
    .bind(version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Set is_default on one version
pub async fn mark_default(pool: &SqlitePool, project_slug: &str, version: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE versions
        SET is_default = 1, updated_at = CURRENT_TIMESTAMP
        WHERE project_slug = ? AND version = ? AND is_default = 0
        "#,
    )
    .bind(project_slug)
    .bind(version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Set the derived status on a version only when none is recorded yet,
/// or when the previous value was itself derived. Upstream-supplied
/// status tokens always win over the derived window.
pub async fn set_derived_status(
    pool: &SqlitePool,
    guid: Uuid,
    status: &str,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE versions
        SET status = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
          AND (status IS NULL OR status IN ('ACTIVE', 'END_OF_LIFE'))
          AND (status IS NULL OR status != ?)
        "#,
    )
    .bind(status)
    .bind(guid.to_string())
    .bind(status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Count versions with is_latest set for a project (test/diagnostic aid)
pub async fn count_latest(pool: &SqlitePool, project_slug: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM versions WHERE project_slug = ? AND is_latest = 1",
    )
    .bind(project_slug)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::projects::{insert_project, Project};
    use crate::db::test_pool;

    async fn seeded_pool() -> SqlitePool {
        let pool = test_pool().await;
        insert_project(&pool, &Project::new("spring-boot", "Spring Boot"))
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_load_version() {
        let pool = seeded_pool().await;

        let version = Version::new("spring-boot", "3.5.0");
        insert_version(&pool, &version).await.expect("insert");

        let loaded = load_version(&pool, "spring-boot", "3.5.0")
            .await
            .expect("load")
            .expect("version found");

        assert_eq!(loaded.major, 3);
        assert_eq!(loaded.minor, 5);
        assert_eq!(loaded.patch, Some(0));
        assert_eq!(loaded.state, VersionState::Ga);
        assert!(!loaded.is_latest);
    }

    #[tokio::test]
    async fn test_snapshot_classified_on_creation() {
        let pool = seeded_pool().await;

        insert_version(&pool, &Version::new("spring-boot", "4.0.0-SNAPSHOT"))
            .await
            .unwrap();

        let loaded = load_version(&pool, "spring-boot", "4.0.0-SNAPSHOT")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.state, VersionState::Snapshot);
    }

    #[tokio::test]
    async fn test_generation_listing() {
        let pool = seeded_pool().await;

        for v in ["3.5.0", "3.5.1", "3.6.0"] {
            insert_version(&pool, &Version::new("spring-boot", v))
                .await
                .unwrap();
        }

        let generation = list_versions_in_generation(&pool, "spring-boot", 3, 5)
            .await
            .unwrap();
        assert_eq!(generation.len(), 2);
        assert!(generation.iter().all(|v| v.minor == 5));
    }

    #[tokio::test]
    async fn test_latest_flag_transitions() {
        let pool = seeded_pool().await;

        insert_version(&pool, &Version::new("spring-boot", "3.4.0"))
            .await
            .unwrap();
        insert_version(&pool, &Version::new("spring-boot", "3.5.0"))
            .await
            .unwrap();

        assert_eq!(mark_latest(&pool, "spring-boot", "3.4.0").await.unwrap(), 1);
        assert_eq!(
            clear_latest_except(&pool, "spring-boot", "3.5.0").await.unwrap(),
            1
        );
        assert_eq!(mark_latest(&pool, "spring-boot", "3.5.0").await.unwrap(), 1);

        assert_eq!(count_latest(&pool, "spring-boot").await.unwrap(), 1);

        // Marking again is a no-op
        assert_eq!(mark_latest(&pool, "spring-boot", "3.5.0").await.unwrap(), 0);
    }
}
