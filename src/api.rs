//! API client for the remote podcast catalog.
//!
//! The catalog exposes two JSON endpoints: `GET /shows` for the full listing
//! and `GET /id/{id}` for one podcast with its seasons and episodes.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{PodcastPreview, Show};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Base delay between retries in milliseconds (doubles each retry).
const BASE_RETRY_DELAY_MS: u64 = 500;

const USER_AGENT: &str = concat!("podcast-browser/", env!("CARGO_PKG_VERSION"));

/// Anything that can serve catalog data.
///
/// Views are written against this trait so they can be exercised without
/// network access.
pub trait CatalogSource {
    /// Fetch the full podcast listing.
    fn fetch_shows(&self) -> impl Future<Output = Result<Vec<PodcastPreview>>> + Send;

    /// Fetch one podcast with its seasons and episodes.
    fn fetch_show(&self, podcast_id: &str) -> impl Future<Output = Result<Show>> + Send;
}

/// Check if an error is retryable (network errors, timeouts, server errors).
fn is_retryable_error(error: &AppError) -> bool {
    matches!(error, AppError::Network(_))
}

/// Retry an async operation with exponential backoff.
///
/// Retries the operation up to `max_retries` times on network errors,
/// with exponential backoff starting at `BASE_RETRY_DELAY_MS`. With
/// `max_retries == 0` the first failure is returned unchanged.
async fn retry_with_backoff<T, F, Fut>(operation_name: &str, max_retries: u32, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!("{} succeeded after {} attempts", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) if attempt < max_retries && is_retryable_error(&e) => {
                let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2_u64.pow(attempt));
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                    operation_name,
                    attempt + 1,
                    max_retries + 1,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// HTTP client for the catalog API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl CatalogClient {
    /// Build a client for `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            config.request_timeout(),
            config.max_retries,
        )
    }

    pub fn shows_url(&self) -> String {
        format!("{}/shows", self.base_url)
    }

    pub fn show_url(&self, podcast_id: &str) -> String {
        format!("{}/id/{}", self.base_url, podcast_id)
    }

    /// GET a URL and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Network response was not ok: {} (status code: {})",
                status.canonical_reason().unwrap_or("Unknown"),
                status.as_u16()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse response from {}: {}", url, e)))
    }
}

impl CatalogSource for CatalogClient {
    async fn fetch_shows(&self) -> Result<Vec<PodcastPreview>> {
        let url = self.shows_url();
        debug!("Fetching catalog from {}", url);

        let shows: Vec<PodcastPreview> =
            retry_with_backoff("Fetch catalog", self.max_retries, || self.get_json(&url)).await?;

        debug!("Catalog returned {} podcasts", shows.len());
        Ok(shows)
    }

    async fn fetch_show(&self, podcast_id: &str) -> Result<Show> {
        let url = self.show_url(podcast_id);
        debug!("Fetching podcast {} from {}", podcast_id, url);

        retry_with_backoff(
            &format!("Fetch podcast {}", podcast_id),
            self.max_retries,
            || self.get_json(&url),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client =
            CatalogClient::new("https://podcast-api.netlify.app/", Duration::from_secs(5), 0)
                .unwrap();
        assert_eq!(client.shows_url(), "https://podcast-api.netlify.app/shows");
        assert_eq!(
            client.show_url("10716"),
            "https://podcast-api.netlify.app/id/10716"
        );
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let config = Config {
            api_base_url: "http://localhost:9000".to_string(),
            ..Config::new()
        };
        let client = CatalogClient::from_config(&config).unwrap();
        assert_eq!(client.shows_url(), "http://localhost:9000/shows");
    }

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(is_retryable_error(&AppError::Network("timeout".into())));
        assert!(!is_retryable_error(&AppError::Parse("bad json".into())));
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff("op", 0, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Network("down".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parse_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff("op", 3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Parse("bad".into())) }
        })
        .await;

        assert!(matches!(result, Err(AppError::Parse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_then_succeed() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff("op", 2, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(AppError::Network("blip".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
    }
}
