use serde::Deserialize;

/// Main configuration structure for Sitemap-Digest
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// defaults below. The site list and backup root normally come from the
/// environment or the command line (see [`crate::config::resolve_sites`]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub title: TitleConfig,
    #[serde(default)]
    pub backup: BackupConfig,

    /// Site base URLs to crawl, in the order given
    #[serde(skip)]
    pub sites: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrent-pages-open")]
    pub max_concurrent_pages_open: u32,

    /// Retries after the first attempt when a response has a non-success status
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Lower bound (inclusive) of the randomized retry delay, in milliseconds
    #[serde(rename = "min-backoff-ms")]
    pub min_backoff_ms: u64,

    /// Upper bound (exclusive) of the randomized retry delay, in milliseconds
    #[serde(rename = "max-backoff-ms")]
    pub max_backoff_ms: u64,

    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages_open: 10,
            max_retries: 3,
            min_backoff_ms: 300,
            max_backoff_ms: 1300,
            request_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "sitemap-digest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Which element carries a page's title
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Heading tag name, matched case-insensitively
    pub tag: String,

    /// Exact value the element's `class` attribute must have
    pub class: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            tag: "h3".to_string(),
            class: "post-title entry-title".to_string(),
        }
    }
}

/// Raw page backup configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Root directory for backups; `None` disables backup entirely
    pub path: Option<String>,

    /// Only pages whose URL path ends with this suffix are backed up
    #[serde(rename = "page-suffix")]
    pub page_suffix: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            path: None,
            page_suffix: ".html".to_string(),
        }
    }
}
