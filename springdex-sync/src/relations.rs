//! Project relationship detection
//!
//! Parent/child candidates come from the navigation markup, merged with
//! a static fallback table for hierarchies the markup never exposes.
//! The fallback is plain data passed in, not ambient state: tests and
//! callers can substitute their own table.

use crate::db::{projects, relationships};
use crate::sources::navigation::parse_navigation;
use crate::sync::result::PhaseStats;
use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, BTreeSet};

/// Known hierarchies not discoverable from navigation markup
pub const FALLBACK_RELATIONSHIPS: &[(&str, &[&str])] = &[
    (
        "spring-data",
        &[
            "spring-data-jpa",
            "spring-data-mongodb",
            "spring-data-redis",
            "spring-data-rest",
            "spring-data-elasticsearch",
        ],
    ),
    (
        "spring-cloud",
        &[
            "spring-cloud-gateway",
            "spring-cloud-config",
            "spring-cloud-netflix",
            "spring-cloud-stream",
        ],
    ),
    (
        "spring-security",
        &["spring-security-kerberos", "spring-authorization-server"],
    ),
    ("spring-session", &["spring-session-data-redis"]),
];

/// Merge detected pairs with the fallback table. Fallback children are
/// unioned into parents the markup already discovered and added
/// wholesale for parents it did not; detected pairs are never removed.
pub fn merge_with_fallback(
    detected: Vec<(String, String)>,
    fallback: &[(&str, &[&str])],
) -> Vec<(String, String)> {
    let mut by_parent: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (parent, child) in detected {
        by_parent.entry(parent).or_default().insert(child);
    }

    for (parent, children) in fallback {
        let entry = by_parent.entry(parent.to_string()).or_default();
        for child in *children {
            entry.insert(child.to_string());
        }
    }

    by_parent
        .into_iter()
        .flat_map(|(parent, children)| {
            children
                .into_iter()
                .map(move |child| (parent.clone(), child))
        })
        .collect()
}

/// Parse navigation HTML and merge in the fallback table
pub fn detect_relationships(
    html: &str,
    fallback: &[(&str, &[&str])],
) -> Vec<(String, String)> {
    merge_with_fallback(parse_navigation(html), fallback)
}

/// Create relationship links for each (parent, child) pair. A pair
/// whose parent or child project is not yet registered is counted as a
/// skip, never an error; existing links are skipped too.
pub async fn sync_relationships(
    pool: &SqlitePool,
    pairs: &[(String, String)],
) -> Result<PhaseStats> {
    let mut stats = PhaseStats::default();

    for (parent, child) in pairs {
        if !projects::project_exists(pool, parent).await? {
            tracing::debug!(parent = %parent, child = %child, "Skipping link: parent unknown");
            stats.skipped += 1;
            continue;
        }
        if !projects::project_exists(pool, child).await? {
            tracing::debug!(parent = %parent, child = %child, "Skipping link: child unknown");
            stats.skipped += 1;
            continue;
        }
        if relationships::relationship_exists(pool, parent, child).await? {
            stats.skipped += 1;
            continue;
        }

        relationships::insert_relationship(pool, parent, child).await?;
        tracing::info!(parent = %parent, child = %child, "Created project relationship");
        stats.created += 1;
    }

    Ok(stats)
}
