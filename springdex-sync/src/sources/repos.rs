//! Repository-listing source (GitHub-style org listing)
//!
//! Supplies sample repositories for the code-example phase. Archived
//! repositories are dropped during parsing.

use super::Fetcher;
use serde::Deserialize;

/// One repository from the org listing
#[derive(Debug, Clone, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

/// Parse the repository listing payload, dropping archived entries
pub fn parse_repos(payload: &str) -> Option<Vec<RepoEntry>> {
    let parsed: Vec<RepoEntry> = match serde_json::from_str(payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Repository listing did not match expected shape");
            return None;
        }
    };

    Some(parsed.into_iter().filter(|repo| !repo.archived).collect())
}

/// Client for the repository listing
pub struct ReposClient {
    fetcher: Fetcher,
    url: String,
}

impl ReposClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(timeout_secs)?,
            url: url.into(),
        })
    }

    /// Fetch and parse the repository listing. `None` when the fetch
    /// fails or the payload is unusable.
    pub async fn fetch_repos(&self) -> Option<Vec<RepoEntry>> {
        let body = self.fetcher.get_text(&self.url).await?;
        let repos = parse_repos(&body)?;

        tracing::info!(count = repos.len(), "Fetched repository listing");

        Some(repos)
    }
}
