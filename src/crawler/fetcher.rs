//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for sitemaps and pages
//! - Retry with randomized backoff on non-success status codes

use crate::config::{Config, CrawlerConfig, UserAgentConfig};
use crate::DigestError;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
///
/// A fetch that exhausted its retries still yields a `FetchResult`; its
/// `status` then carries the last non-success code and `body` the error page.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status of the last response received
    pub status: StatusCode,

    /// Number of GET requests issued, including the first
    pub attempts: u32,

    /// Fully drained response body
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Returns true if the last response had a 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// How often and how patiently a non-success response is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Inclusive lower bound of the backoff delay
    pub min_backoff: Duration,

    /// Exclusive upper bound of the backoff delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Builds a policy from the crawler section of the configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            min_backoff: Duration::from_millis(config.min_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Draws a delay uniformly from `[min_backoff, max_backoff)`
    pub fn backoff(&self) -> Duration {
        let min = self.min_backoff.as_millis() as u64;
        let max = self.max_backoff.as_millis() as u64;
        if max <= min {
            return self.min_backoff;
        }
        Duration::from_millis(rand::rng().random_range(min..max))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - The crawler configuration (for the request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_digest::config::{CrawlerConfig, UserAgentConfig};
/// use sitemap_digest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", user_agent.crawler_name, user_agent.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests on behalf of the resolver and the page workers
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher from an existing client and retry policy
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Creates a fetcher configured from the crawler and user agent sections
    pub fn from_config(config: &Config) -> Result<Self, DigestError> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;
        Ok(Self::new(client, RetryPolicy::from_config(&config.crawler)))
    }

    /// Returns the retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL, retrying on non-success status codes
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return immediately |
    /// | Any other status | Sleep a random backoff, retry up to `max_retries` times |
    /// | Retries exhausted | Return the last response (status and body) |
    /// | Connection or body read error | Fail with `DigestError::Http`, no retry |
    ///
    /// Every response body is read to completion before the next decision, so
    /// the connection goes back to the pool on every path.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - The last response received
    /// * `Err(DigestError)` - Transport failure
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, DigestError> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|source| DigestError::Http {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            let final_url = response.url().to_string();
            let body = response
                .bytes()
                .await
                .map_err(|source| DigestError::Http {
                    url: url.to_string(),
                    source,
                })?
                .to_vec();

            if status.is_success() {
                return Ok(FetchResult {
                    final_url,
                    status,
                    attempts,
                    body,
                });
            }

            if attempts > self.policy.max_retries {
                tracing::warn!(
                    "GET {} returned {} after {} attempts, using last response",
                    url,
                    status,
                    attempts
                );
                return Ok(FetchResult {
                    final_url,
                    status,
                    attempts,
                    body,
                });
            }

            let delay = self.policy.backoff();
            tracing::warn!(
                "GET {} returned {} (attempt {}/{}), retrying in {}ms",
                url,
                status,
                attempts,
                self.policy.max_retries + 1,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}
