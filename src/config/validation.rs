use crate::config::types::{BackupConfig, Config, CrawlerConfig, TitleConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the tunable sections of the configuration
///
/// The site list is validated separately by [`validate_sites`] because it is
/// usually resolved after the file has been loaded.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_title_config(&config.title)?;
    validate_backup_config(&config.backup)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_concurrent_pages_open < 1 || config.max_concurrent_pages_open > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages_open must be between 1 and 100, got {}",
            config.max_concurrent_pages_open
        )));
    }

    if config.min_backoff_ms >= config.max_backoff_ms {
        return Err(ConfigError::Validation(format!(
            "min_backoff_ms ({}) must be less than max_backoff_ms ({})",
            config.min_backoff_ms, config.max_backoff_ms
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

fn validate_title_config(config: &TitleConfig) -> ConfigResult<()> {
    if config.tag.is_empty() || !config.tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "title tag must be a non-empty tag name, got '{}'",
            config.tag
        )));
    }

    if config.class.is_empty() {
        return Err(ConfigError::Validation(
            "title class cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_backup_config(config: &BackupConfig) -> ConfigResult<()> {
    if config.page_suffix.is_empty() {
        return Err(ConfigError::Validation(
            "page_suffix cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site base URLs
///
/// Each site must use the `http` or `https` scheme and parse as an absolute URL
/// with a host. An empty list is a [`ConfigError::MissingSite`].
pub fn validate_sites(sites: &[String]) -> ConfigResult<()> {
    if sites.is_empty() {
        return Err(ConfigError::MissingSite);
    }

    for site in sites {
        if !(site.starts_with("http://") || site.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(format!(
                "Site URL '{}' must start with http:// or https://",
                site
            )));
        }

        let url = Url::parse(site)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", site, e)))?;

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Site URL '{}' has no host",
                site
            )));
        }
    }

    Ok(())
}
