//! Project registry
//!
//! Guarantees a canonical project row exists for a slug. Any source may
//! reference a project first; the registry creates it with defaults and
//! later fills descriptive fields that are still empty. It never
//! overwrites data a richer source already supplied.

use crate::db::projects::{self, Project};
use crate::sync::result::RecordOutcome;
use anyhow::Result;
use sqlx::SqlitePool;

/// Derive a display name from a slug: `spring-data-jpa` → `Spring Data Jpa`
pub fn display_name_from_slug(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ensure a project exists for the slug, creating it with defaults on
/// first reference. Idempotent: a second call with the same slug only
/// fills descriptive fields that were previously empty.
pub async fn ensure_project(
    pool: &SqlitePool,
    slug: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<RecordOutcome> {
    match projects::load_project(pool, slug).await? {
        None => {
            let mut project = Project::new(
                slug,
                name.map(str::to_string)
                    .unwrap_or_else(|| display_name_from_slug(slug)),
            );
            project.description = description.map(str::to_string);

            projects::insert_project(pool, &project).await?;
            tracing::info!(project = %slug, "Created project");
            Ok(RecordOutcome::Created)
        }
        Some(mut existing) => {
            let mut changed = false;

            if existing.description.is_none() {
                if let Some(description) = description {
                    existing.description = Some(description.to_string());
                    changed = true;
                }
            }
            // A real display name replaces the slug-derived default
            if let Some(name) = name {
                if existing.name == display_name_from_slug(slug) && existing.name != name {
                    existing.name = name.to_string();
                    changed = true;
                }
            }

            if changed {
                projects::update_project(pool, &existing).await?;
                tracing::debug!(project = %slug, "Filled project descriptive fields");
                Ok(RecordOutcome::Updated)
            } else {
                Ok(RecordOutcome::Skipped)
            }
        }
    }
}
