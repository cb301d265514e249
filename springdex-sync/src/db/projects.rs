//! Project database operations
//!
//! Projects key on their slug. The pipeline creates a project the first
//! time any source references it and never deletes one.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

/// Project record
#[derive(Debug, Clone)]
pub struct Project {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub homepage_url: String,
    pub repository_url: String,
    pub active: bool,
}

impl Project {
    /// Create a new project with URLs derived from the slug
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            homepage_url: format!("https://spring.io/projects/{}", slug),
            repository_url: format!("https://github.com/spring-projects/{}", slug),
            slug,
            name: name.into(),
            description: None,
            active: true,
        }
    }
}

/// Insert a new project
pub async fn insert_project(pool: &SqlitePool, project: &Project) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO projects (slug, name, description, homepage_url, repository_url, active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&project.slug)
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.homepage_url)
    .bind(&project.repository_url)
    .bind(project.active)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update a project's descriptive fields
pub async fn update_project(pool: &SqlitePool, project: &Project) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE projects
        SET name = ?, description = ?
        WHERE slug = ?
        "#,
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.slug)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load project by slug
pub async fn load_project(pool: &SqlitePool, slug: &str) -> Result<Option<Project>> {
    let row = sqlx::query(
        r#"
        SELECT slug, name, description, homepage_url, repository_url, active
        FROM projects
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Project {
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        homepage_url: row.get("homepage_url"),
        repository_url: row.get("repository_url"),
        active: row.get("active"),
    }))
}

/// Check whether a project exists
pub async fn project_exists(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// List every known project slug, ordered
pub async fn list_project_slugs(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT slug FROM projects ORDER BY slug")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("slug")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_insert_and_load_project() {
        let pool = test_pool().await;

        let project = Project::new("spring-data", "Spring Data");
        insert_project(&pool, &project).await.expect("insert");

        let loaded = load_project(&pool, "spring-data")
            .await
            .expect("load")
            .expect("project found");

        assert_eq!(loaded.slug, "spring-data");
        assert_eq!(loaded.name, "Spring Data");
        assert_eq!(loaded.homepage_url, "https://spring.io/projects/spring-data");
        assert!(loaded.active);
        assert!(loaded.description.is_none());
    }

    #[tokio::test]
    async fn test_project_exists() {
        let pool = test_pool().await;

        assert!(!project_exists(&pool, "spring-boot").await.unwrap());

        insert_project(&pool, &Project::new("spring-boot", "Spring Boot"))
            .await
            .unwrap();

        assert!(project_exists(&pool, "spring-boot").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_project_slugs_ordered() {
        let pool = test_pool().await;

        insert_project(&pool, &Project::new("spring-security", "Spring Security"))
            .await
            .unwrap();
        insert_project(&pool, &Project::new("spring-boot", "Spring Boot"))
            .await
            .unwrap();

        let slugs = list_project_slugs(&pool).await.unwrap();
        assert_eq!(slugs, vec!["spring-boot", "spring-security"]);
    }
}
