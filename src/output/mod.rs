//! Output module for presenting crawl results
//!
//! This module handles:
//! - Ordering a site's entries by last modification
//! - Rendering the ordered HTML link list
//! - Recording per-site crawl statistics

mod list;
pub mod stats;

pub use list::{render_list, sort_by_last_modified};
pub use stats::{log_statistics, CrawlStatistics};
