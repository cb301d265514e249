//! Guide-page source
//!
//! The guide index lists getting-started and tutorial pages, each
//! optionally tagged with the project it demonstrates.

use super::Fetcher;
use serde::Deserialize;

/// One guide entry from the index
#[derive(Debug, Clone, Deserialize)]
pub struct GuideEntry {
    pub title: String,
    pub url: String,
    pub project: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GuideIndex {
    #[serde(default)]
    guides: Vec<GuideEntry>,
}

/// Parse the guide index payload
pub fn parse_guides(payload: &str) -> Option<Vec<GuideEntry>> {
    let parsed: GuideIndex = match serde_json::from_str(payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Guide index payload did not match expected shape");
            return None;
        }
    };

    Some(parsed.guides)
}

/// Client for the guide index
pub struct GuidesClient {
    fetcher: Fetcher,
    url: String,
}

impl GuidesClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(timeout_secs)?,
            url: url.into(),
        })
    }

    /// Fetch and parse the guide index. `None` when the fetch fails or
    /// the payload is unusable.
    pub async fn fetch_guides(&self) -> Option<Vec<GuideEntry>> {
        let body = self.fetcher.get_text(&self.url).await?;
        let guides = parse_guides(&body)?;

        tracing::info!(count = guides.len(), "Fetched guide index");

        Some(guides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_guides() {
        let payload = r#"{
            "guides": [
                {"title": "Building a RESTful Web Service",
                 "url": "https://spring.io/guides/gs/rest-service",
                 "project": "spring-boot",
                 "description": "Learn how to create a RESTful web service."},
                {"title": "Accessing Data with JPA",
                 "url": "https://spring.io/guides/gs/accessing-data-jpa",
                 "project": null, "description": null}
            ]
        }"#;

        let guides = parse_guides(payload).expect("index parses");
        assert_eq!(guides.len(), 2);
        assert_eq!(guides[0].project.as_deref(), Some("spring-boot"));
        assert!(guides[1].project.is_none());
    }

    #[test]
    fn test_parse_guides_empty() {
        assert!(parse_guides(r#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_guides_malformed() {
        assert!(parse_guides("<html>").is_none());
    }
}
