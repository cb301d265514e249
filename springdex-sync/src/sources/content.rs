//! Documentation content source
//!
//! Fetches raw documentation pages for the content-sync phase. The
//! phase hashes each page and stores it only when the hash changed.

use super::{Fetcher, SharedRateLimiter};

/// Client for raw documentation pages
pub struct DocContentClient {
    fetcher: Fetcher,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl DocContentClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        rate_limiter: SharedRateLimiter,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(timeout_secs)?,
            base_url: base_url.into(),
            rate_limiter,
        })
    }

    /// Documentation URL for a project
    pub fn page_url(&self, slug: &str) -> String {
        format!("{}/{}/index.html", self.base_url, slug)
    }

    /// Fetch one project's documentation page. `None` on fetch failure.
    pub async fn fetch_page(&self, slug: &str) -> Option<String> {
        self.rate_limiter.wait().await;
        self.fetcher.get_text(&self.page_url(slug)).await
    }
}
