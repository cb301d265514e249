//! Source clients for the upstream metadata services
//!
//! Each client owns its typed intermediate structs and a bounded-timeout
//! HTTP fetcher. Transport failures yield a sentinel `None` rather than
//! an error: callers treat "no data" as a valid, non-fatal phase
//! outcome. Fetching and parsing are separate so payload parsing stays
//! testable on literal strings.

pub mod content;
pub mod generations;
pub mod guides;
pub mod metadata;
pub mod navigation;
pub mod project_page;
pub mod repos;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const USER_AGENT: &str = concat!("springdex/", env!("CARGO_PKG_VERSION"));

/// Bounded-timeout HTTP fetch capability shared by all source clients
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// GET a URL, returning the body text or `None` on any failure
    /// (timeout, transport error, non-2xx)
    pub async fn get_text(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Fetch returned non-success status");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to read response body");
                None
            }
        }
    }
}

/// Rate limiter enforcing a minimum interval between requests
///
/// Used by the crawl phases that issue one request per project against
/// the same host.
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with the rate limit
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Shared handle for clients that rate-limit per-project requests
pub type SharedRateLimiter = Arc<RateLimiter>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        assert!(Fetcher::new(30).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_sentinel() {
        // Nothing listens on this port; connection is refused immediately
        let fetcher = Fetcher::new(2).unwrap();
        let result = fetcher.get_text("http://127.0.0.1:1/metadata").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_rate_limiter_timing() {
        let limiter = RateLimiter::new(100);

        let start = Instant::now();

        limiter.wait().await;
        let first_elapsed = start.elapsed();

        limiter.wait().await;
        let second_elapsed = start.elapsed();

        assert!(first_elapsed < Duration::from_millis(50));
        assert!(second_elapsed >= Duration::from_millis(90));
    }
}
