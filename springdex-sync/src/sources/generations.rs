//! Generations / release-train source
//!
//! The payload is a nested map: release-train label → { member project
//! slug → [version patterns] }. Expansion recurses one level: the train,
//! then its members. A malformed train entry is skipped with a warning;
//! the rest of the payload still parses.

use super::Fetcher;
use std::collections::BTreeMap;

/// One member project of a release train
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainMember {
    pub slug: String,
    /// Generation patterns such as `3.6.x`
    pub patterns: Vec<String>,
}

/// A release train: an umbrella label grouping member project
/// generation patterns published together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTrain {
    pub name: String,
    pub members: Vec<TrainMember>,
}

impl ReleaseTrain {
    /// The member carrying the anchor project's patterns, if present
    pub fn member(&self, slug: &str) -> Option<&TrainMember> {
        self.members.iter().find(|m| m.slug == slug)
    }
}

/// Parse the generations payload. Returns `None` only when the outer
/// map is unreadable; individual malformed trains are skipped.
pub fn parse_generations(payload: &str) -> Option<Vec<ReleaseTrain>> {
    let outer: BTreeMap<String, serde_json::Value> = match serde_json::from_str(payload) {
        Ok(outer) => outer,
        Err(e) => {
            tracing::warn!(error = %e, "Generations payload did not match expected shape");
            return None;
        }
    };

    let mut trains = Vec::with_capacity(outer.len());
    for (name, value) in outer {
        let members: BTreeMap<String, Vec<String>> = match serde_json::from_value(value) {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(train = %name, error = %e, "Skipping malformed release train");
                continue;
            }
        };

        trains.push(ReleaseTrain {
            name,
            members: members
                .into_iter()
                .map(|(slug, patterns)| TrainMember { slug, patterns })
                .collect(),
        });
    }

    Some(trains)
}

/// Client for the generations endpoint
pub struct GenerationsClient {
    fetcher: Fetcher,
    url: String,
}

impl GenerationsClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(timeout_secs)?,
            url: url.into(),
        })
    }

    /// Fetch and parse release trains. `None` when the fetch fails or
    /// the payload is unusable.
    pub async fn fetch_trains(&self) -> Option<Vec<ReleaseTrain>> {
        let body = self.fetcher.get_text(&self.url).await?;
        let trains = parse_generations(&body)?;

        tracing::info!(count = trains.len(), "Fetched release trains");

        Some(trains)
    }
}
