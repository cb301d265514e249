//! Per-project page source
//!
//! Each project page carries two independently-keyed arrays: a flat
//! `documentation[]` list (per-version doc URLs and status) and
//! `support.generations[]` (support dates per generation label). They
//! are cross-matched by major.minor equality to produce one observation
//! per documented version.
//!
//! A separate `index` document lists all known projects with their
//! version strings; it backs the supplementary-discovery phase.

use super::Fetcher;
use crate::version::parse_version;
use serde::Deserialize;

/// One entry of the page's `documentation[]` array
#[derive(Debug, Clone, Deserialize)]
pub struct DocEntry {
    pub version: String,
    #[serde(rename = "refDocUrl")]
    pub ref_doc_url: Option<String>,
    #[serde(rename = "apiDocUrl")]
    pub api_doc_url: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub status: Option<String>,
}

/// One entry of the page's `support.generations[]` array
#[derive(Debug, Clone, Deserialize)]
pub struct SupportGeneration {
    /// Generation label such as `3.5.x`
    pub generation: String,
    /// `YYYY-MM`
    #[serde(rename = "initialRelease")]
    pub initial_release: Option<String>,
    #[serde(rename = "ossSupportEnd")]
    pub oss_support_end: Option<String>,
    #[serde(rename = "enterpriseSupportEnd")]
    pub enterprise_support_end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SupportBlock {
    #[serde(default)]
    generations: Vec<SupportGeneration>,
}

/// Parsed per-project page
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPage {
    #[serde(default)]
    pub documentation: Vec<DocEntry>,
    #[serde(default)]
    support: SupportBlock,
}

impl ProjectPage {
    pub fn generations(&self) -> &[SupportGeneration] {
        &self.support.generations
    }
}

/// One reconciler-ready observation: a documented version joined with
/// the support dates of its generation
#[derive(Debug, Clone)]
pub struct VersionObservation {
    pub version: String,
    pub ref_doc_url: Option<String>,
    pub api_doc_url: Option<String>,
    pub current: bool,
    pub status: Option<String>,
    pub release_date: Option<String>,
    pub oss_support_end: Option<String>,
    pub enterprise_support_end: Option<String>,
}

/// Parse a project page payload. `None` on unexpected shape.
pub fn parse_project_page(payload: &str) -> Option<ProjectPage> {
    match serde_json::from_str(payload) {
        Ok(page) => Some(page),
        Err(e) => {
            tracing::warn!(error = %e, "Project page payload did not match expected shape");
            None
        }
    }
}

/// Join documentation entries to support generations by major.minor.
/// Documentation entries without a matching generation still yield an
/// observation, just without dates.
pub fn cross_match(page: &ProjectPage) -> Vec<VersionObservation> {
    page.documentation
        .iter()
        .map(|doc| {
            let doc_numbers = parse_version(&doc.version);
            let support = page
                .generations()
                .iter()
                .find(|gen| parse_version(&gen.generation).same_generation(&doc_numbers));

            VersionObservation {
                version: doc.version.clone(),
                ref_doc_url: doc.ref_doc_url.clone(),
                api_doc_url: doc.api_doc_url.clone(),
                current: doc.current,
                status: doc.status.clone(),
                release_date: support.and_then(|s| s.initial_release.clone()),
                oss_support_end: support.and_then(|s| s.oss_support_end.clone()),
                enterprise_support_end: support.and_then(|s| s.enterprise_support_end.clone()),
            }
        })
        .collect()
}

/// One entry of the project index document
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectIndexEntry {
    pub slug: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProjectIndex {
    #[serde(default)]
    projects: Vec<ProjectIndexEntry>,
}

/// Parse the project index payload
pub fn parse_project_index(payload: &str) -> Option<Vec<ProjectIndexEntry>> {
    let parsed: ProjectIndex = match serde_json::from_str(payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Project index payload did not match expected shape");
            return None;
        }
    };

    Some(parsed.projects)
}

/// Client for per-project pages and the project index
pub struct ProjectPageClient {
    fetcher: Fetcher,
    base_url: String,
}

impl ProjectPageClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(timeout_secs)?,
            base_url: base_url.into(),
        })
    }

    /// Fetch and parse one project's page
    pub async fn fetch_page(&self, slug: &str) -> Option<ProjectPage> {
        let url = format!("{}/{}.json", self.base_url, slug);
        let body = self.fetcher.get_text(&url).await?;
        parse_project_page(&body)
    }

    /// Fetch and parse the project index
    pub async fn fetch_index(&self) -> Option<Vec<ProjectIndexEntry>> {
        let url = format!("{}/index.json", self.base_url);
        let body = self.fetcher.get_text(&url).await?;
        let projects = parse_project_index(&body)?;

        tracing::info!(count = projects.len(), "Fetched project index");

        Some(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "documentation": [
            {"version": "3.5.1", "refDocUrl": "https://docs.spring.io/spring-boot/3.5.1/reference",
             "apiDocUrl": "https://docs.spring.io/spring-boot/3.5.1/api", "current": true,
             "status": "GENERAL_AVAILABILITY"},
            {"version": "3.4.6", "refDocUrl": "https://docs.spring.io/spring-boot/3.4.6/reference",
             "apiDocUrl": null, "current": false, "status": "GENERAL_AVAILABILITY"},
            {"version": "4.0.0-SNAPSHOT", "refDocUrl": null, "apiDocUrl": null,
             "current": false, "status": "SNAPSHOT"}
        ],
        "support": {
            "generations": [
                {"generation": "3.5.x", "initialRelease": "2025-05",
                 "ossSupportEnd": "2026-06", "enterpriseSupportEnd": "2027-08"},
                {"generation": "3.4.x", "initialRelease": "2024-11",
                 "ossSupportEnd": "2025-12", "enterpriseSupportEnd": "2027-02"}
            ]
        }
    }"#;

    #[test]
    fn test_parse_page() {
        let page = parse_project_page(PAGE).expect("page parses");
        assert_eq!(page.documentation.len(), 3);
        assert_eq!(page.generations().len(), 2);
    }

    #[test]
    fn test_cross_match_by_generation() {
        let page = parse_project_page(PAGE).unwrap();
        let observations = cross_match(&page);
        assert_eq!(observations.len(), 3);

        let current = &observations[0];
        assert_eq!(current.version, "3.5.1");
        assert!(current.current);
        assert_eq!(current.release_date.as_deref(), Some("2025-05"));
        assert_eq!(current.oss_support_end.as_deref(), Some("2026-06"));

        let older = &observations[1];
        assert_eq!(older.release_date.as_deref(), Some("2024-11"));

        // 4.0.x has no support generation yet: observation without dates
        let snapshot = &observations[2];
        assert!(snapshot.release_date.is_none());
        assert_eq!(snapshot.status.as_deref(), Some("SNAPSHOT"));
    }

    #[test]
    fn test_parse_page_malformed() {
        assert!(parse_project_page("[]").is_none());
    }

    #[test]
    fn test_empty_page_cross_match() {
        let page = parse_project_page(r#"{}"#).unwrap();
        assert!(cross_match(&page).is_empty());
    }

    #[test]
    fn test_parse_project_index() {
        let payload = r#"{
            "projects": [
                {"slug": "spring-framework", "name": "Spring Framework",
                 "description": "Core support", "versions": ["6.2.1", "6.1.15"]},
                {"slug": "spring-security", "versions": []}
            ]
        }"#;

        let projects = parse_project_index(payload).expect("index parses");
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].versions.len(), 2);
        assert!(projects[1].name.is_none());
    }
}
