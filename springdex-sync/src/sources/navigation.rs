//! HTML navigation source
//!
//! Parent/child project candidates come from the portal's navigation
//! markup: nested lists where a parent project's anchor is followed by a
//! sub-list of its member projects. The markup has changed shape over
//! time, so several candidate selectors are tried in sequence and the
//! first one yielding any pairs wins.

use super::Fetcher;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Candidate selectors for parent entries, newest markup first
const CANDIDATE_SELECTORS: &[&str] = &[
    "nav.projects-nav li.has-children",
    "ul.projects-tree > li",
    "div.project-list li.parent",
];

static CHILD_ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul a").expect("valid child selector"));
static ANY_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid anchor selector"));

/// Extract the project slug from an anchor's href, if it points at a
/// project page
fn slug_from_anchor(anchor: &ElementRef) -> Option<String> {
    let href = anchor.value().attr("href")?;
    let trimmed = href.trim_end_matches('/');
    let (_, slug) = trimmed.rsplit_once("/projects/")?;
    if slug.is_empty() || slug.contains('/') {
        return None;
    }
    Some(slug.to_string())
}

/// Parse navigation HTML into (parent slug, child slug) pairs
///
/// Tries each candidate selector in order; the first selector that
/// produces at least one pair decides the result.
pub fn parse_navigation(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);

    for selector_str in CANDIDATE_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!(selector = %selector_str, error = ?e, "Invalid navigation selector");
                continue;
            }
        };

        let mut pairs = Vec::new();
        for item in document.select(&selector) {
            let Some(parent_anchor) = item.select(&ANY_ANCHOR).next() else {
                continue;
            };
            let Some(parent) = slug_from_anchor(&parent_anchor) else {
                continue;
            };

            for child_anchor in item.select(&CHILD_ANCHORS) {
                if let Some(child) = slug_from_anchor(&child_anchor) {
                    if child != parent && !pairs.contains(&(parent.clone(), child.clone())) {
                        pairs.push((parent.clone(), child));
                    }
                }
            }
        }

        if !pairs.is_empty() {
            tracing::debug!(
                selector = %selector_str,
                count = pairs.len(),
                "Navigation selector matched"
            );
            return pairs;
        }
    }

    tracing::warn!("No navigation selector produced any parent/child pairs");
    Vec::new()
}

/// Client for the navigation HTML page
pub struct NavigationClient {
    fetcher: Fetcher,
    url: String,
}

impl NavigationClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(timeout_secs)?,
            url: url.into(),
        })
    }

    /// Fetch the navigation page. `None` when the fetch fails.
    pub async fn fetch_html(&self) -> Option<String> {
        self.fetcher.get_text(&self.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV_HTML: &str = r#"
        <nav class="projects-nav">
          <ul>
            <li class="has-children">
              <a href="/projects/spring-data">Spring Data</a>
              <ul>
                <li><a href="/projects/spring-data-jpa">Spring Data JPA</a></li>
                <li><a href="/projects/spring-data-mongodb">Spring Data MongoDB</a></li>
              </ul>
            </li>
            <li class="has-children">
              <a href="/projects/spring-cloud">Spring Cloud</a>
              <ul>
                <li><a href="/projects/spring-cloud-gateway">Gateway</a></li>
              </ul>
            </li>
            <li><a href="/projects/spring-boot">Spring Boot</a></li>
          </ul>
        </nav>
    "#;

    #[test]
    fn test_parse_nested_navigation() {
        let pairs = parse_navigation(NAV_HTML);
        assert_eq!(
            pairs,
            vec![
                ("spring-data".to_string(), "spring-data-jpa".to_string()),
                ("spring-data".to_string(), "spring-data-mongodb".to_string()),
                ("spring-cloud".to_string(), "spring-cloud-gateway".to_string()),
            ]
        );
    }

    #[test]
    fn test_fallback_selector_wins_when_first_empty() {
        // No nav.projects-nav here; the second candidate selector matches
        let html = r#"
            <ul class="projects-tree">
              <li>
                <a href="/projects/spring-session">Spring Session</a>
                <ul><li><a href="/projects/spring-session-data-redis">Redis</a></li></ul>
              </li>
            </ul>
        "#;

        let pairs = parse_navigation(html);
        assert_eq!(
            pairs,
            vec![(
                "spring-session".to_string(),
                "spring-session-data-redis".to_string()
            )]
        );
    }

    #[test]
    fn test_no_selector_matches() {
        assert!(parse_navigation("<p>nothing here</p>").is_empty());
    }

    #[test]
    fn test_non_project_links_ignored() {
        let html = r#"
            <nav class="projects-nav">
              <li class="has-children">
                <a href="/projects/spring-data">Spring Data</a>
                <ul>
                  <li><a href="https://github.com/spring-projects">GitHub</a></li>
                  <li><a href="/projects/spring-data-jpa">JPA</a></li>
                </ul>
              </li>
            </nav>
        "#;

        let pairs = parse_navigation(html);
        assert_eq!(
            pairs,
            vec![("spring-data".to_string(), "spring-data-jpa".to_string())]
        );
    }

    #[test]
    fn test_slug_extraction_tolerates_trailing_slash() {
        let html = r#"
            <ul class="projects-tree">
              <li>
                <a href="/projects/spring-data/">Spring Data</a>
                <ul><li><a href="/projects/spring-data-rest/">REST</a></li></ul>
              </li>
            </ul>
        "#;

        let pairs = parse_navigation(html);
        assert_eq!(
            pairs,
            vec![("spring-data".to_string(), "spring-data-rest".to_string())]
        );
    }
}
