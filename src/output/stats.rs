//! Per-site crawl statistics
//!
//! Collected by the coordinator while a site is crawled and logged once the
//! site is done.

use std::time::Duration;

/// Crawl statistics for one site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages listed by the sitemap (after index flattening)
    pub pages_listed: usize,

    /// Pages fetched by the workers
    pub pages_fetched: usize,

    /// Pages whose last response had a non-success status
    pub pages_degraded: usize,

    /// Pages with a non-empty extracted title
    pub titles_found: usize,

    /// Pages written to the backup directory
    pub pages_backed_up: usize,

    /// Highest number of page fetches in flight at the same time
    pub peak_in_flight: usize,

    /// Wall time spent on the site
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Pages fetched without a title, as a percentage of pages fetched
    pub fn missing_title_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            return 0.0;
        }
        (self.pages_fetched - self.titles_found) as f64 / self.pages_fetched as f64 * 100.0
    }
}

/// Logs statistics for a finished site
///
/// # Arguments
///
/// * `site` - The site base URL
/// * `stats` - The statistics to display
pub fn log_statistics(site: &str, stats: &CrawlStatistics) {
    tracing::info!(
        "{}: {} pages listed, {} fetched, {} titles ({:.1}% missing), {} degraded, {} backed up",
        site,
        stats.pages_listed,
        stats.pages_fetched,
        stats.titles_found,
        stats.missing_title_rate(),
        stats.pages_degraded,
        stats.pages_backed_up
    );
    tracing::debug!(
        "{}: peak {} concurrent fetches, finished in {:?}",
        site,
        stats.peak_in_flight,
        stats.elapsed
    );
}
