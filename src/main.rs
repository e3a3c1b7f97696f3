//! Sitemap-Digest main entry point
//!
//! This is the command-line interface for the Sitemap-Digest title indexer.

use clap::Parser;
use std::path::PathBuf;
use sitemap_digest::config::{load_config_with_hash, resolve_backup_path, resolve_sites, Config};
use sitemap_digest::crawler::crawl;
use tracing_subscriber::EnvFilter;

/// Sitemap-Digest: a sitemap-driven title indexer
///
/// Sitemap-Digest reads each site's sitemap.xml, fetches every listed page,
/// extracts the post title and prints an HTML list of links ordered by last
/// modification. The SITE and BACKUP_PATH environment variables take
/// precedence over --site and --backup.
#[derive(Parser, Debug)]
#[command(name = "sitemap-digest")]
#[command(version)]
#[command(about = "A sitemap-driven title indexer", long_about = None)]
struct Cli {
    /// Site URLs, comma-separated, e.g. https://alextech18.blogspot.com
    #[arg(long, value_name = "URLS")]
    site: Option<String>,

    /// Root directory for raw page backups and archives
    #[arg(long, value_name = "DIR")]
    backup: Option<String>,

    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_configuration(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Crawling {} site(s), backup {}",
        config.sites.len(),
        config.backup.path.as_deref().unwrap_or("disabled")
    );

    match crawl(config).await {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the rendered link lists.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_digest=info,warn"),
            1 => EnvFilter::new("sitemap_digest=debug,info"),
            2 => EnvFilter::new("sitemap_digest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the effective configuration from the file, environment and flags
fn load_configuration(cli: &Cli) -> sitemap_digest::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    config.sites = resolve_sites(std::env::var("SITE").ok(), cli.site.clone())?;

    let file_backup = config.backup.path.take();
    config.backup.path = resolve_backup_path(
        std::env::var("BACKUP_PATH").ok(),
        cli.backup.clone().or(file_backup),
    );

    Ok(config)
}
