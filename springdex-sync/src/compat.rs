//! Compatibility matrix expansion
//!
//! Upstream expresses compatibility at the generation level ("Boot
//! 3.5.x supports Data 3.6.x"); queries need it at the concrete-version
//! level. Expansion loads every persisted version on each side of the
//! generation pair and creates the full cross-product of links,
//! skipping pairs that already exist.

use crate::db::{compatibility, versions};
use crate::version::parse_version;
use anyhow::Result;
use sqlx::SqlitePool;

/// Outcome of one generation-pair expansion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionOutcome {
    pub created: usize,
    pub skipped: usize,
    /// No persisted anchor version matched the anchor generation
    pub anchor_unresolved: bool,
    /// No persisted target version matched the target generation
    pub target_unresolved: bool,
}

/// Expand a generation-pattern pair into concrete compatibility links
///
/// Both patterns are generation strings such as `3.5.x`; all persisted
/// versions sharing each pattern's major.minor participate.
pub async fn expand(
    pool: &SqlitePool,
    anchor_slug: &str,
    anchor_pattern: &str,
    target_slug: &str,
    target_pattern: &str,
) -> Result<ExpansionOutcome> {
    let anchor_gen = parse_version(anchor_pattern);
    let target_gen = parse_version(target_pattern);

    let anchors = versions::list_versions_in_generation(
        pool,
        anchor_slug,
        anchor_gen.major,
        anchor_gen.minor,
    )
    .await?;

    if anchors.is_empty() {
        tracing::warn!(
            anchor = %anchor_slug,
            pattern = %anchor_pattern,
            "No persisted anchor versions for generation"
        );
        return Ok(ExpansionOutcome {
            anchor_unresolved: true,
            ..Default::default()
        });
    }

    let targets = versions::list_versions_in_generation(
        pool,
        target_slug,
        target_gen.major,
        target_gen.minor,
    )
    .await?;

    if targets.is_empty() {
        tracing::debug!(
            target = %target_slug,
            pattern = %target_pattern,
            "No persisted target versions for generation"
        );
        return Ok(ExpansionOutcome {
            target_unresolved: true,
            ..Default::default()
        });
    }

    let mut outcome = ExpansionOutcome::default();
    for anchor in &anchors {
        for target in &targets {
            if compatibility::link_exists(pool, anchor.guid, target.guid).await? {
                outcome.skipped += 1;
            } else {
                compatibility::insert_link(pool, anchor.guid, target.guid).await?;
                outcome.created += 1;
            }
        }
    }

    tracing::debug!(
        anchor = %anchor_slug,
        anchor_pattern = %anchor_pattern,
        target = %target_slug,
        target_pattern = %target_pattern,
        created = outcome.created,
        skipped = outcome.skipped,
        "Expanded compatibility generation pair"
    );

    Ok(outcome)
}
