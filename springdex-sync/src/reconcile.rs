//! Version reconciliation
//!
//! Find-or-create versions by (project, version string) and merge in
//! newly-observed fields. The merge contract: an observed non-null
//! value overwrites, an observed null never clobbers existing data.
//! Later, sparser sources therefore cannot erase what richer sources
//! supplied.

use crate::db::versions::{self, Version};
use crate::sync::result::RecordOutcome;
use crate::version::VersionState;
use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::BTreeSet;

/// Fields a source may observe for a version. `None` means "not
/// observed", never "observed to be absent".
#[derive(Debug, Clone, Default)]
pub struct ObservedFields {
    pub ref_doc_url: Option<String>,
    pub api_doc_url: Option<String>,
    pub release_date: Option<String>,
    pub oss_support_end: Option<String>,
    pub enterprise_support_end: Option<String>,
    pub status: Option<String>,
}

fn merge_field(existing: &mut Option<String>, observed: &Option<String>) -> bool {
    match observed {
        Some(value) if existing.as_deref() != Some(value.as_str()) => {
            *existing = Some(value.clone());
            true
        }
        _ => false,
    }
}

/// Find-or-create a version and merge observed fields into it
pub async fn reconcile(
    pool: &SqlitePool,
    project_slug: &str,
    version_str: &str,
    observed: &ObservedFields,
) -> Result<RecordOutcome> {
    match versions::load_version(pool, project_slug, version_str).await? {
        None => {
            let mut version = Version::new(project_slug, version_str);
            // Classification can use the upstream status token on creation
            version.state =
                VersionState::classify(version_str, observed.status.as_deref());
            version.ref_doc_url = observed.ref_doc_url.clone();
            version.api_doc_url = observed.api_doc_url.clone();
            version.release_date = observed.release_date.clone();
            version.oss_support_end = observed.oss_support_end.clone();
            version.enterprise_support_end = observed.enterprise_support_end.clone();
            version.status = observed.status.clone();

            versions::insert_version(pool, &version).await?;
            tracing::debug!(project = %project_slug, version = %version_str, "Created version");
            Ok(RecordOutcome::Created)
        }
        Some(mut existing) => {
            let mut changed = false;
            changed |= merge_field(&mut existing.ref_doc_url, &observed.ref_doc_url);
            changed |= merge_field(&mut existing.api_doc_url, &observed.api_doc_url);
            changed |= merge_field(&mut existing.release_date, &observed.release_date);
            changed |= merge_field(&mut existing.oss_support_end, &observed.oss_support_end);
            changed |= merge_field(
                &mut existing.enterprise_support_end,
                &observed.enterprise_support_end,
            );
            changed |= merge_field(&mut existing.status, &observed.status);

            if changed {
                versions::update_version(pool, &existing).await?;
                tracing::debug!(project = %project_slug, version = %version_str, "Updated version");
                Ok(RecordOutcome::Updated)
            } else {
                Ok(RecordOutcome::Skipped)
            }
        }
    }
}

/// Promote a version to be its project's single latest. Clears the flag
/// on every other version first. A missing target is a warned no-op.
pub async fn promote_latest(
    pool: &SqlitePool,
    project_slug: &str,
    version_str: &str,
) -> Result<RecordOutcome> {
    if versions::load_version(pool, project_slug, version_str).await?.is_none() {
        tracing::warn!(
            project = %project_slug,
            version = %version_str,
            "Cannot promote latest: version not persisted"
        );
        return Ok(RecordOutcome::Skipped);
    }

    let cleared = versions::clear_latest_except(pool, project_slug, version_str).await?;
    let marked = versions::mark_latest(pool, project_slug, version_str).await?;

    if cleared + marked > 0 {
        tracing::info!(project = %project_slug, version = %version_str, "Promoted latest version");
        Ok(RecordOutcome::Updated)
    } else {
        Ok(RecordOutcome::Skipped)
    }
}

/// Promote a version to be its project's single default
pub async fn promote_default(
    pool: &SqlitePool,
    project_slug: &str,
    version_str: &str,
) -> Result<RecordOutcome> {
    if versions::load_version(pool, project_slug, version_str).await?.is_none() {
        tracing::warn!(
            project = %project_slug,
            version = %version_str,
            "Cannot promote default: version not persisted"
        );
        return Ok(RecordOutcome::Skipped);
    }

    let cleared = versions::clear_default_except(pool, project_slug, version_str).await?;
    let marked = versions::mark_default(pool, project_slug, version_str).await?;

    if cleared + marked > 0 {
        Ok(RecordOutcome::Updated)
    } else {
        Ok(RecordOutcome::Skipped)
    }
}

/// Apply the n-2 support window: the three newest GA generations of a
/// project are ACTIVE, older GA generations END_OF_LIFE. Only fills
/// derived status; upstream-supplied status tokens are left alone.
/// Returns the number of versions whose status changed.
pub async fn apply_active_window(pool: &SqlitePool, project_slug: &str) -> Result<usize> {
    let all = versions::list_versions(pool, project_slug).await?;

    let mut generations: BTreeSet<(i64, i64)> = BTreeSet::new();
    for version in all.iter().filter(|v| v.state == VersionState::Ga) {
        generations.insert((version.major, version.minor));
    }

    // Latest stable generation plus its two predecessors
    let active: BTreeSet<(i64, i64)> =
        generations.iter().rev().take(3).copied().collect();

    let mut changed = 0;
    for version in all.iter().filter(|v| v.state == VersionState::Ga) {
        let status = if active.contains(&(version.major, version.minor)) {
            "ACTIVE"
        } else {
            "END_OF_LIFE"
        };
        changed += versions::set_derived_status(pool, version.guid, status).await? as usize;
    }

    Ok(changed)
}
