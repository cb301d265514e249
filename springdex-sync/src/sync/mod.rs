//! Comprehensive sync orchestration
//!
//! Seven phases run strictly in order; each one may fail on its own
//! without halting the sequence. A failed fetch, a malformed record, or
//! an error escaping a phase is recorded in that phase's result and the
//! next phase still runs. Overall success is the logical AND of every
//! phase's success.
//!
//! Phase order (later phases depend on rows the earlier ones create):
//! 1. anchor versions        - the anchor project's own version list
//! 2. generations            - release trains expanded into compatibility links
//! 3. project index          - supplementary project/version discovery
//! 4. project pages          - per-project date/URL enrichment crawl
//! 5. relationships          - parent/child hierarchy detection
//! 6. documentation content  - fetch, hash, store-if-changed
//! 7. code examples          - guides and repository listings

pub mod progress;
pub mod result;

use crate::compat;
use crate::db::{content, examples, projects};
use crate::reconcile::{self, ObservedFields};
use crate::registry::ensure_project;
use crate::relations::{self, FALLBACK_RELATIONSHIPS};
use crate::sources::generations::{GenerationsClient, ReleaseTrain};
use crate::sources::guides::{GuideEntry, GuidesClient};
use crate::sources::metadata::{AnchorVersions, MetadataClient};
use crate::sources::navigation::NavigationClient;
use crate::sources::project_page::{
    cross_match, ProjectIndexEntry, ProjectPageClient, VersionObservation,
};
use crate::sources::repos::{RepoEntry, ReposClient};
use crate::sources::{content::DocContentClient, RateLimiter};
use crate::version::{parse_version, VersionState};
use anyhow::Result;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use progress::ProgressReporter;
use result::{ComprehensiveSyncResult, PhaseResult, PhaseStats};
use sha2::{Digest, Sha256};
use springdex_common::config::SourceEndpoints;
use springdex_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// The project every compatibility expansion anchors on
pub const ANCHOR_PROJECT: &str = "spring-boot";

/// Number of orchestrated phases
pub const TOTAL_PHASES: usize = 7;

/// Concurrent project crawls in the page-enrichment phase. Each project
/// is processed wholly within one task, so a project's version set only
/// ever has a single writer.
const CRAWL_CONCURRENCY: usize = 4;

/// Minimum interval between documentation content fetches
const DOC_FETCH_INTERVAL_MS: u64 = 250;

const PHASE_NAMES: [&str; TOTAL_PHASES] = [
    "anchor-versions",
    "generations",
    "project-index",
    "project-pages",
    "relationships",
    "doc-content",
    "code-examples",
];

const PHASE_DESCRIPTIONS: [&str; TOTAL_PHASES] = [
    "Syncing anchor project versions",
    "Expanding release-train compatibility",
    "Discovering projects from the index",
    "Crawling per-project pages",
    "Detecting project relationships",
    "Syncing documentation content",
    "Syncing code examples",
];

/// Orchestrator for the full multi-source sync
pub struct ComprehensiveSync {
    db: SqlitePool,
    events: EventBus,
    metadata: MetadataClient,
    generations: GenerationsClient,
    project_pages: ProjectPageClient,
    navigation: NavigationClient,
    guides: GuidesClient,
    repos: ReposClient,
    docs: DocContentClient,
}

impl ComprehensiveSync {
    pub fn new(
        db: SqlitePool,
        events: EventBus,
        endpoints: &SourceEndpoints,
    ) -> Result<Self> {
        let timeout = endpoints.fetch_timeout_secs;
        let doc_rate_limiter = Arc::new(RateLimiter::new(DOC_FETCH_INTERVAL_MS));

        Ok(Self {
            db,
            events,
            metadata: MetadataClient::new(&endpoints.metadata_url, timeout)?,
            generations: GenerationsClient::new(&endpoints.generations_url, timeout)?,
            project_pages: ProjectPageClient::new(&endpoints.project_page_url, timeout)?,
            navigation: NavigationClient::new(&endpoints.navigation_url, timeout)?,
            guides: GuidesClient::new(&endpoints.guides_url, timeout)?,
            repos: ReposClient::new(&endpoints.repos_url, timeout)?,
            docs: DocContentClient::new(&endpoints.docs_url, timeout, doc_rate_limiter)?,
        })
    }

    /// Run every phase in order. Cancellation is cooperative and checked
    /// at phase boundaries only.
    pub async fn run(
        &self,
        run_id: Uuid,
        cancel_token: CancellationToken,
    ) -> ComprehensiveSyncResult {
        let started_at = Utc::now();
        let reporter = ProgressReporter::new(self.events.clone(), run_id, TOTAL_PHASES);

        tracing::info!(run_id = %run_id, "Starting comprehensive sync");
        reporter.sync_started();

        let mut phases = Vec::with_capacity(TOTAL_PHASES);
        let mut cancelled = false;

        for index in 0..TOTAL_PHASES {
            if cancel_token.is_cancelled() {
                tracing::info!(
                    run_id = %run_id,
                    phases_completed = phases.len(),
                    "Sync cancelled between phases"
                );
                reporter.sync_cancelled(phases.len());
                cancelled = true;
                break;
            }

            reporter.phase_started(index, PHASE_DESCRIPTIONS[index]);
            let phase_started = Utc::now();

            let phase_result = match self.execute_phase(index).await {
                Ok(result) => result,
                Err(e) => {
                    // Nothing inside a phase may take the whole run down
                    tracing::error!(
                        run_id = %run_id,
                        phase = PHASE_NAMES[index],
                        error = ?e,
                        "Phase failed with an escaped error"
                    );
                    PhaseResult::failed(PHASE_NAMES[index], phase_started, e.to_string())
                }
            };

            tracing::info!(
                run_id = %run_id,
                phase = PHASE_NAMES[index],
                success = phase_result.success,
                created = phase_result.created,
                updated = phase_result.updated,
                skipped = phase_result.skipped,
                errors = phase_result.errors,
                "Phase completed"
            );
            reporter.phase_completed(index, PHASE_DESCRIPTIONS[index], &phase_result);
            phases.push(phase_result);
        }

        let result = ComprehensiveSyncResult::from_phases(run_id, started_at, phases, cancelled);

        if !cancelled {
            tracing::info!(
                run_id = %run_id,
                success = result.success,
                created = result.created,
                updated = result.updated,
                skipped = result.skipped,
                errors = result.errors,
                duration_seconds = result.duration_seconds(),
                "Comprehensive sync finished"
            );
            reporter.sync_completed(&result);
        }

        result
    }

    /// Run one phase by name (for the single-phase trigger)
    pub async fn run_phase(&self, name: &str) -> Result<PhaseResult> {
        let index = PHASE_NAMES
            .iter()
            .position(|phase| *phase == name)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown phase '{}' (expected one of: {})",
                    name,
                    PHASE_NAMES.join(", ")
                )
            })?;

        let phase_started = Utc::now();
        match self.execute_phase(index).await {
            Ok(result) => Ok(result),
            Err(e) => Ok(PhaseResult::failed(
                PHASE_NAMES[index],
                phase_started,
                e.to_string(),
            )),
        }
    }

    async fn execute_phase(&self, index: usize) -> Result<PhaseResult> {
        match index {
            0 => self.phase_anchor_versions().await,
            1 => self.phase_generations().await,
            2 => self.phase_project_index().await,
            3 => self.phase_project_pages().await,
            4 => self.phase_relationships().await,
            5 => self.phase_doc_content().await,
            6 => self.phase_code_examples().await,
            _ => unreachable!("phase index out of range"),
        }
    }

    /// Phase 1: the anchor project's own versions, the primary table of
    /// truth for every later compatibility expansion
    async fn phase_anchor_versions(&self) -> Result<PhaseResult> {
        let started = Utc::now();

        let Some(anchor) = self.metadata.fetch_versions().await else {
            return Ok(PhaseResult::failed(
                PHASE_NAMES[0],
                started,
                "Metadata source returned no data",
            ));
        };

        let stats = apply_anchor_versions(&self.db, &anchor).await?;
        Ok(PhaseResult::completed(PHASE_NAMES[0], started, stats))
    }

    /// Phase 2: release trains into concrete compatibility links
    async fn phase_generations(&self) -> Result<PhaseResult> {
        let started = Utc::now();

        let Some(trains) = self.generations.fetch_trains().await else {
            return Ok(PhaseResult::failed(
                PHASE_NAMES[1],
                started,
                "Generations source returned no data",
            ));
        };

        let stats = apply_release_trains(&self.db, &trains).await?;
        Ok(PhaseResult::completed(PHASE_NAMES[1], started, stats))
    }

    /// Phase 3: supplementary project and version discovery
    async fn phase_project_index(&self) -> Result<PhaseResult> {
        let started = Utc::now();

        let Some(entries) = self.project_pages.fetch_index().await else {
            return Ok(PhaseResult::failed(
                PHASE_NAMES[2],
                started,
                "Project index returned no data",
            ));
        };

        let stats = apply_project_index(&self.db, &entries).await?;
        Ok(PhaseResult::completed(PHASE_NAMES[2], started, stats))
    }

    /// Phase 4: crawl every known project's page for dates and doc
    /// URLs. Projects are crawled concurrently; one project's failure
    /// is counted and the rest continue.
    async fn phase_project_pages(&self) -> Result<PhaseResult> {
        let started = Utc::now();

        let slugs = projects::list_project_slugs(&self.db).await?;
        let client = &self.project_pages;
        let pool = &self.db;

        let outcomes: Vec<(String, Result<PhaseStats>)> = stream::iter(slugs)
            .map(|slug| async move {
                match client.fetch_page(&slug).await {
                    None => (
                        slug,
                        Err(anyhow::anyhow!("Project page fetch returned no data")),
                    ),
                    Some(page) => {
                        let observations = cross_match(&page);
                        let applied =
                            apply_version_observations(pool, &slug, &observations).await;
                        (slug, applied)
                    }
                }
            })
            .buffer_unordered(CRAWL_CONCURRENCY)
            .collect()
            .await;

        let mut stats = PhaseStats::default();
        for (slug, outcome) in outcomes {
            match outcome {
                Ok(project_stats) => stats.merge(project_stats),
                Err(e) => {
                    tracing::warn!(project = %slug, error = %e, "Project page crawl failed");
                    stats.errors += 1;
                }
            }
        }

        Ok(PhaseResult::completed(PHASE_NAMES[3], started, stats))
    }

    /// Phase 5: parent/child hierarchy detection
    async fn phase_relationships(&self) -> Result<PhaseResult> {
        let started = Utc::now();

        let Some(html) = self.navigation.fetch_html().await else {
            return Ok(PhaseResult::failed(
                PHASE_NAMES[4],
                started,
                "Navigation source returned no data",
            ));
        };

        let pairs = relations::detect_relationships(&html, FALLBACK_RELATIONSHIPS);
        let stats = relations::sync_relationships(&self.db, &pairs).await?;
        Ok(PhaseResult::completed(PHASE_NAMES[4], started, stats))
    }

    /// Phase 6: documentation content, stored only when its hash changed
    async fn phase_doc_content(&self) -> Result<PhaseResult> {
        let started = Utc::now();

        let slugs = projects::list_project_slugs(&self.db).await?;
        let mut stats = PhaseStats::default();

        for slug in slugs {
            let Some(body) = self.docs.fetch_page(&slug).await else {
                stats.errors += 1;
                continue;
            };

            let hash = format!("{:x}", Sha256::digest(body.as_bytes()));
            let url = self.docs.page_url(&slug);

            match content::load_page_hash(&self.db, &slug, &url).await? {
                Some(existing) if existing == hash => stats.skipped += 1,
                Some(_) => {
                    content::upsert_page(&self.db, &slug, &url, &hash, &body).await?;
                    tracing::debug!(project = %slug, "Documentation content changed");
                    stats.updated += 1;
                }
                None => {
                    content::upsert_page(&self.db, &slug, &url, &hash, &body).await?;
                    stats.created += 1;
                }
            }
        }

        Ok(PhaseResult::completed(PHASE_NAMES[5], started, stats))
    }

    /// Phase 7: code examples from guides and repository listings. One
    /// source failing is counted; the phase only fails when both do.
    async fn phase_code_examples(&self) -> Result<PhaseResult> {
        let started = Utc::now();

        let guides = self.guides.fetch_guides().await;
        let repos = self.repos.fetch_repos().await;

        if guides.is_none() && repos.is_none() {
            return Ok(PhaseResult::failed(
                PHASE_NAMES[6],
                started,
                "Both example sources returned no data",
            ));
        }

        let mut stats = PhaseStats::default();
        if guides.is_none() || repos.is_none() {
            stats.errors += 1;
        }

        let applied = apply_code_examples(
            &self.db,
            &guides.unwrap_or_default(),
            &repos.unwrap_or_default(),
        )
        .await?;
        stats.merge(applied);

        Ok(PhaseResult::completed(PHASE_NAMES[6], started, stats))
    }
}

/// The newest GA version in a list, by numeric ordering
fn latest_ga_version(versions: &[String]) -> Option<&String> {
    versions
        .iter()
        .filter(|v| VersionState::classify(v, None) == VersionState::Ga)
        .max_by_key(|v| {
            let parsed = parse_version(v);
            (parsed.major, parsed.minor, parsed.patch.unwrap_or(0))
        })
}

/// Apply anchor versions: ensure the anchor project, reconcile every
/// offered version, promote default and latest, refresh the support
/// window
pub async fn apply_anchor_versions(
    pool: &SqlitePool,
    anchor: &AnchorVersions,
) -> Result<PhaseStats> {
    let mut stats = PhaseStats::default();

    stats.record(
        ensure_project(
            pool,
            ANCHOR_PROJECT,
            Some("Spring Boot"),
            Some("Build stand-alone, production-grade Spring applications"),
        )
        .await?,
    );

    for version in &anchor.versions {
        stats.record(reconcile::reconcile(pool, ANCHOR_PROJECT, version, &ObservedFields::default()).await?);
    }

    if let Some(default_version) = &anchor.default_version {
        stats.record(reconcile::promote_default(pool, ANCHOR_PROJECT, default_version).await?);
    }

    if let Some(latest) = latest_ga_version(&anchor.versions) {
        stats.record(reconcile::promote_latest(pool, ANCHOR_PROJECT, latest).await?);
    }

    let window_changes = reconcile::apply_active_window(pool, ANCHOR_PROJECT).await?;
    stats.updated += window_changes;

    Ok(stats)
}

/// Apply release trains: each train's anchor-member patterns expand
/// against every other member's patterns. Trains without an anchor
/// member, and anchors with no persisted versions, are counted as
/// errors and skipped.
pub async fn apply_release_trains(
    pool: &SqlitePool,
    trains: &[ReleaseTrain],
) -> Result<PhaseStats> {
    let mut stats = PhaseStats::default();

    for train in trains {
        let Some(anchor_member) = train.member(ANCHOR_PROJECT) else {
            tracing::warn!(train = %train.name, "Release train has no anchor project entry");
            stats.errors += 1;
            continue;
        };

        for member in train.members.iter().filter(|m| m.slug != ANCHOR_PROJECT) {
            stats.record(ensure_project(pool, &member.slug, None, None).await?);

            for anchor_pattern in &anchor_member.patterns {
                for target_pattern in &member.patterns {
                    let outcome = compat::expand(
                        pool,
                        ANCHOR_PROJECT,
                        anchor_pattern,
                        &member.slug,
                        target_pattern,
                    )
                    .await?;

                    stats.created += outcome.created;
                    stats.skipped += outcome.skipped;
                    if outcome.anchor_unresolved {
                        stats.errors += 1;
                    }
                    if outcome.target_unresolved {
                        stats.skipped += 1;
                    }
                }
            }
        }
    }

    Ok(stats)
}

/// Apply the project index: supplementary project and version discovery
pub async fn apply_project_index(
    pool: &SqlitePool,
    entries: &[ProjectIndexEntry],
) -> Result<PhaseStats> {
    let mut stats = PhaseStats::default();

    for entry in entries {
        stats.record(
            ensure_project(
                pool,
                &entry.slug,
                entry.name.as_deref(),
                entry.description.as_deref(),
            )
            .await?,
        );

        for version in &entry.versions {
            stats.record(
                reconcile::reconcile(pool, &entry.slug, version, &ObservedFields::default())
                    .await?,
            );
        }
    }

    Ok(stats)
}

/// Apply one project's page observations: reconcile every documented
/// version with its dates and URLs, then promote the entry the page
/// marks current
pub async fn apply_version_observations(
    pool: &SqlitePool,
    slug: &str,
    observations: &[VersionObservation],
) -> Result<PhaseStats> {
    let mut stats = PhaseStats::default();

    for observation in observations {
        let observed = ObservedFields {
            ref_doc_url: observation.ref_doc_url.clone(),
            api_doc_url: observation.api_doc_url.clone(),
            release_date: observation.release_date.clone(),
            oss_support_end: observation.oss_support_end.clone(),
            enterprise_support_end: observation.enterprise_support_end.clone(),
            status: observation.status.clone(),
        };

        stats.record(reconcile::reconcile(pool, slug, &observation.version, &observed).await?);
    }

    if let Some(current) = observations.iter().find(|o| o.current) {
        stats.record(reconcile::promote_latest(pool, slug, &current.version).await?);
    }

    Ok(stats)
}

/// Apply code examples from both sources, keyed by URL
pub async fn apply_code_examples(
    pool: &SqlitePool,
    guides: &[GuideEntry],
    repos: &[RepoEntry],
) -> Result<PhaseStats> {
    let mut stats = PhaseStats::default();

    let mut records = Vec::with_capacity(guides.len() + repos.len());
    for guide in guides {
        if let Some(project) = &guide.project {
            stats.record(ensure_project(pool, project, None, None).await?);
        }
        records.push(examples::CodeExample {
            url: guide.url.clone(),
            project_slug: guide.project.clone(),
            title: guide.title.clone(),
            source: "guide".to_string(),
            description: guide.description.clone(),
        });
    }
    for repo in repos {
        records.push(examples::CodeExample {
            url: repo.html_url.clone(),
            project_slug: None,
            title: repo.name.clone(),
            source: "repository".to_string(),
            description: repo.description.clone(),
        });
    }

    for record in records {
        match examples::load_example(pool, &record.url).await? {
            None => {
                examples::upsert_example(pool, &record).await?;
                stats.created += 1;
            }
            Some(existing) if existing == record => stats.skipped += 1,
            Some(_) => {
                examples::upsert_example(pool, &record).await?;
                stats.updated += 1;
            }
        }
    }

    Ok(stats)
}

/// List of orchestrated phase names, in execution order
pub fn phase_names() -> &'static [&'static str] {
    &PHASE_NAMES
}
