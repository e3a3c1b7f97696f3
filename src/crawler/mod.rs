//! Crawler module for sitemap resolution and page processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Sitemap and sitemap-index decoding
//! - HTML title extraction
//! - Bounded-concurrency crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod sitemap;

pub use coordinator::{Coordinator, SiteReport};
pub use fetcher::{build_http_client, FetchResult, Fetcher, RetryPolicy};
pub use parser::{extract_title, page_title, TitleRule};
pub use sitemap::{
    decode_sitemap_index, decode_urlset, is_sitemap_index, resolve_document, resolve_sitemap,
    SiteUrl,
};

use crate::config::Config;
use crate::DigestError;

/// Runs a complete crawl operation
///
/// Every site in `config.sites` is crawled in order; each site's link list is
/// printed to stdout as soon as that site is done.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(())` - Every site was crawled
/// * `Err(DigestError)` - A site failed; later sites were not crawled
///
/// # Example
///
/// ```no_run
/// use sitemap_digest::config::{resolve_sites, Config};
/// use sitemap_digest::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.sites = resolve_sites(None, Some("https://example.com".to_string()))?;
/// crawl(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<(), DigestError> {
    Coordinator::new(config)?.run().await
}
