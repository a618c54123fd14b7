//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client
//! - Rotating user agents per request
//! - Bounded retry on soft-block responses (429/503)

use crate::config::FetchConfig;
use crate::{MercatoError, Result};
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Desktop Chrome user agents rotated uniformly at random per request.
/// Low entropy, low risk.
const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
];

/// A fetched page, returned whether or not the status indicates success
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: StatusCode,

    /// Response body
    pub body: String,
}

impl FetchedPage {
    /// Whether the response is worth parsing
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP client wrapper carrying the fetch policy
pub struct FetchClient {
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl FetchClient {
    /// Builds a fetch client from the configured policy
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            // Retries wait out the same politeness gap as regular requests
            retry_backoff: Duration::from_millis(config.base_delay_ms),
        })
    }

    /// Picks a user agent uniformly at random from the pool
    fn pick_user_agent() -> &'static str {
        USER_AGENTS[fastrand::usize(..USER_AGENTS.len())]
    }

    /// Fetches a URL, retrying soft blocks up to the configured limit
    ///
    /// A 429 or 503 response is retried with a fresh attempt (and a fresh
    /// user agent) up to `max_retries` extra times; beyond that the response
    /// is passed through as-is for the caller to judge. Network-level errors
    /// are returned as [`MercatoError::Http`].
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let mut attempt = 0;

        loop {
            let response = self
                .client
                .get(url)
                .header(USER_AGENT, Self::pick_user_agent())
                .send()
                .await
                .map_err(|source| MercatoError::Http {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();

            if matches!(
                status,
                StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
            ) && attempt < self.max_retries
            {
                attempt += 1;
                tracing::warn!(
                    "Retrying {} ({}) attempt {}/{}",
                    url,
                    status.as_u16(),
                    attempt,
                    self.max_retries
                );
                tokio::time::sleep(self.retry_backoff).await;
                continue;
            }

            let final_url = response.url().to_string();
            let body = response.text().await.map_err(|source| MercatoError::Http {
                url: url.to_string(),
                source,
            })?;

            return Ok(FetchedPage {
                final_url,
                status,
                body,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;

    fn test_fetch_config() -> FetchConfig {
        FetchConfig {
            search_url: "https://shop.example.com/search".to_string(),
            base_delay_ms: 10,
            min_delay_ms: 5,
            max_delay_ms: 50,
            max_retries: 2,
            use_embedded_fallback: false,
        }
    }

    #[test]
    fn test_build_fetch_client() {
        let client = FetchClient::new(&test_fetch_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_pool_membership() {
        for _ in 0..20 {
            let ua = FetchClient::pick_user_agent();
            assert!(USER_AGENTS.contains(&ua));
        }
    }

    // Retry behavior against live status codes is covered by the wiremock
    // integration tests.
}
