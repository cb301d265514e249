//! Dependency-metadata source (Initializr-style)
//!
//! Primary source of truth for the anchor project's own versions. The
//! payload carries a `bootVersion` group: a default version id plus the
//! list of currently offered version ids.

use super::Fetcher;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct MetadataPayload {
    #[serde(rename = "bootVersion")]
    boot_version: BootVersionGroup,
}

#[derive(Debug, Clone, Deserialize)]
struct BootVersionGroup {
    default: Option<String>,
    #[serde(default)]
    values: Vec<BootVersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct BootVersionEntry {
    id: String,
    #[allow(dead_code)]
    name: Option<String>,
}

/// Anchor-project versions discovered from the metadata source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorVersions {
    /// The version the source marks as default
    pub default_version: Option<String>,
    /// All offered version ids, in payload order
    pub versions: Vec<String>,
}

/// Parse the metadata payload. `None` on unexpected shape.
pub fn parse_metadata(payload: &str) -> Option<AnchorVersions> {
    let parsed: MetadataPayload = match serde_json::from_str(payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Metadata payload did not match expected shape");
            return None;
        }
    };

    Some(AnchorVersions {
        default_version: parsed.boot_version.default,
        versions: parsed
            .boot_version
            .values
            .into_iter()
            .map(|entry| entry.id)
            .collect(),
    })
}

/// Client for the dependency-metadata endpoint
pub struct MetadataClient {
    fetcher: Fetcher,
    url: String,
}

impl MetadataClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(timeout_secs)?,
            url: url.into(),
        })
    }

    /// Fetch and parse the anchor version list. `None` when the fetch
    /// fails or the payload is unusable.
    pub async fn fetch_versions(&self) -> Option<AnchorVersions> {
        let body = self.fetcher.get_text(&self.url).await?;
        let versions = parse_metadata(&body)?;

        tracing::info!(
            count = versions.versions.len(),
            default = versions.default_version.as_deref().unwrap_or("-"),
            "Fetched anchor versions from metadata source"
        );

        Some(versions)
    }
}
