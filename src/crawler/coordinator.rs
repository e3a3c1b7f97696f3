//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one crawl per configured site, strictly one site after
//! another:
//! - Resolving the site's sitemap into an ordered batch
//! - Fetching every page with a bounded number of concurrent workers
//! - Writing each extracted title back into the worker's own slot
//! - Finalizing the backup archive and printing the link list

use crate::backup::{archive_file_name, backup_dir, ensure_dir, BackupSink};
use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{page_title, TitleRule};
use crate::crawler::sitemap::{resolve_sitemap, SiteUrl};
use crate::output::{log_statistics, render_list, sort_by_last_modified, CrawlStatistics};
use crate::url::site_host;
use crate::DigestError;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Everything produced by crawling one site
#[derive(Debug, Clone)]
pub struct SiteReport {
    /// The site base URL as configured
    pub site: String,

    /// Entries in final (sorted) order with their titles filled in
    pub batch: Vec<SiteUrl>,

    /// Counters collected during the crawl
    pub statistics: CrawlStatistics,

    /// The backup archive, if backup is enabled and any page was stored
    pub archive: Option<PathBuf>,
}

impl SiteReport {
    /// Renders the site's ordered link list
    pub fn render(&self) -> String {
        render_list(&self.batch)
    }
}

/// What a worker learned about its page
#[derive(Debug)]
struct PageOutcome {
    title: String,
    backed_up: bool,
    degraded: bool,
}

/// Counts page fetches currently holding a permit
#[derive(Debug, Default)]
struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    title_rule: Arc<TitleRule>,
    permits: Arc<Semaphore>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration, including the sites to crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(DigestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, DigestError> {
        let fetcher = Fetcher::from_config(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Creates a coordinator that issues requests through the given fetcher
    pub fn with_fetcher(config: Config, fetcher: Fetcher) -> Self {
        let permits = Arc::new(Semaphore::new(
            config.crawler.max_concurrent_pages_open as usize,
        ));
        let title_rule = Arc::new(TitleRule::from_config(&config.title));

        Self {
            config: Arc::new(config),
            fetcher,
            title_rule,
            permits,
        }
    }

    /// Crawls every configured site in order and prints each link list
    ///
    /// The first failure stops the run: nothing is printed for the failing
    /// site and later sites are not crawled.
    pub async fn run(&self) -> Result<(), DigestError> {
        for site in &self.config.sites {
            let report = self.crawl_site(site).await?;
            println!("{}", report.render());
        }
        Ok(())
    }

    /// Crawls a single site
    ///
    /// 1. Resolve the sitemap (flattening an index) into a batch
    /// 2. Sort the batch by `lastmod`, stable
    /// 3. Spawn one worker per slot; each waits for a permit before fetching
    /// 4. Join every worker, writing titles into their slots
    /// 5. Bundle the backed-up pages into the site's archive
    ///
    /// Any worker error aborts the remaining workers and is returned.
    ///
    /// # Arguments
    ///
    /// * `site` - The site base URL
    ///
    /// # Returns
    ///
    /// * `Ok(SiteReport)` - The ordered, titled batch and crawl statistics
    /// * `Err(DigestError)` - Resolution, a page fetch, or persistence failed
    pub async fn crawl_site(&self, site: &str) -> Result<SiteReport, DigestError> {
        let started = Instant::now();
        let host = site_host(site)?;
        let date = Local::now().date_naive();

        let mut batch = resolve_sitemap(&self.fetcher, site).await?;
        sort_by_last_modified(&mut batch);
        tracing::info!("{} lists {} pages", site, batch.len());

        let sink = self.backup_sink(&host, date)?.map(Arc::new);
        let gauge = Arc::new(InFlightGauge::default());
        let mut statistics = CrawlStatistics {
            pages_listed: batch.len(),
            ..Default::default()
        };

        let mut workers = JoinSet::new();
        for (slot, entry) in batch.iter().enumerate() {
            // Each worker owns copies of its slot index and location
            let location = entry.location.clone();
            let permits = Arc::clone(&self.permits);
            let fetcher = self.fetcher.clone();
            let rule = Arc::clone(&self.title_rule);
            let sink = sink.clone();
            let gauge = Arc::clone(&gauge);

            workers.spawn(async move {
                let _permit = permits.acquire_owned().await?;
                gauge.enter();
                let outcome = process_page(&fetcher, &rule, sink.as_deref(), &location).await;
                gauge.leave();
                outcome.map(|outcome| (slot, outcome))
            });
        }

        while let Some(joined) = workers.join_next().await {
            let (slot, outcome) = joined??;
            statistics.pages_fetched += 1;
            statistics.titles_found += usize::from(!outcome.title.is_empty());
            statistics.pages_backed_up += usize::from(outcome.backed_up);
            statistics.pages_degraded += usize::from(outcome.degraded);
            batch[slot].title = outcome.title;
        }
        statistics.peak_in_flight = gauge.peak();

        let archive = match &sink {
            Some(sink) => sink.finalize(&archive_file_name(date, &host))?,
            None => None,
        };

        statistics.elapsed = started.elapsed();
        log_statistics(site, &statistics);

        Ok(SiteReport {
            site: site.to_string(),
            batch,
            statistics,
            archive,
        })
    }

    /// Prepares the site's dated backup directory when backup is enabled
    fn backup_sink(&self, host: &str, date: NaiveDate) -> Result<Option<BackupSink>, DigestError> {
        let Some(root) = &self.config.backup.path else {
            return Ok(None);
        };

        let dir = backup_dir(Path::new(root), host, date);
        ensure_dir(&dir)?;
        tracing::info!("Backing up pages to {}", dir.display());

        Ok(Some(BackupSink::new(
            dir,
            self.config.backup.page_suffix.clone(),
        )))
    }
}

/// Fetches one page, backs it up if applicable, and extracts its title
async fn process_page(
    fetcher: &Fetcher,
    rule: &TitleRule,
    sink: Option<&BackupSink>,
    location: &str,
) -> Result<PageOutcome, DigestError> {
    tracing::debug!("Fetching {}", location);
    let page = fetcher.fetch(location).await?;

    let backed_up = match sink {
        Some(sink) => sink.store(&page.body, location).await?,
        None => false,
    };

    let title = page_title(&page.body, rule);
    if title.is_empty() {
        tracing::debug!("No title found on {}", location);
    }

    Ok(PageOutcome {
        title,
        backed_up,
        degraded: !page.is_success(),
    })
}
