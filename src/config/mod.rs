//! Configuration module for Sitemap-Digest
//!
//! Tunables live in an optional TOML file; the site list and backup root are
//! taken from the `SITE` and `BACKUP_PATH` environment variables, falling back
//! to the matching command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_digest::config::{load_config, resolve_sites};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("digest.toml")).unwrap();
//! config.sites = resolve_sites(std::env::var("SITE").ok(), None).unwrap();
//! ```

mod parser;
mod types;
mod validation;

pub use types::{BackupConfig, Config, CrawlerConfig, TitleConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_sites};

use crate::{ConfigError, ConfigResult};

/// Picks the environment value when it is set and non-empty, else the flag value
fn env_or_flag(env: Option<String>, flag: Option<String>) -> Option<String> {
    env.filter(|v| !v.is_empty())
        .or(flag)
        .filter(|v| !v.is_empty())
}

/// Resolves the comma-separated site list
///
/// # Arguments
///
/// * `env` - Value of the `SITE` environment variable, if any
/// * `flag` - Value of the `--site` flag, if any
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Trimmed, validated site URLs in the order given
/// * `Err(ConfigError)` - No site was given or one of them is malformed
pub fn resolve_sites(env: Option<String>, flag: Option<String>) -> ConfigResult<Vec<String>> {
    let raw = env_or_flag(env, flag).ok_or(ConfigError::MissingSite)?;

    let sites: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    validate_sites(&sites)?;
    Ok(sites)
}

/// Resolves the backup root directory; `None` leaves backup disabled
pub fn resolve_backup_path(env: Option<String>, flag: Option<String>) -> Option<String> {
    env_or_flag(env, flag)
}
