//! URL handling module for Sitemap-Digest
//!
//! This module provides sitemap location derivation, domain extraction and
//! host sanitizing for file names.

mod domain;

pub use domain::{extract_domain, sanitize_host, site_host};

/// File name of the sitemap looked up under every site base URL
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Derives the sitemap location for a site base URL
///
/// A trailing `/` is added when missing, then [`SITEMAP_FILE`] is appended.
///
/// # Examples
///
/// ```
/// use sitemap_digest::url::sitemap_url;
///
/// assert_eq!(sitemap_url("https://example.com"), "https://example.com/sitemap.xml");
/// assert_eq!(sitemap_url("https://example.com/"), "https://example.com/sitemap.xml");
/// ```
pub fn sitemap_url(base: &str) -> String {
    let mut target = String::with_capacity(base.len() + SITEMAP_FILE.len() + 1);
    target.push_str(base);
    if !target.ends_with('/') {
        target.push('/');
    }
    target.push_str(SITEMAP_FILE);
    target
}
