//! Sitemap and sitemap-index resolution
//!
//! A site's `sitemap.xml` is either a `<urlset>` listing pages directly or a
//! `<sitemapindex>` pointing at child sitemaps. Index documents are flattened
//! into a single ordered batch: child order first, then each child's own order.

use crate::crawler::fetcher::Fetcher;
use crate::url::sitemap_url;
use crate::DigestError;
use quick_xml::events::Event;
use quick_xml::{DeError, Reader};
use serde::Deserialize;

/// Marker probed for in the raw document to detect a sitemap index
const SITEMAP_INDEX_MARKER: &[u8] = b"<sitemapindex";

/// One page listed in a sitemap
///
/// Identity is the entry's position in the batch, not its location: the same
/// location may legitimately appear twice and is crawled twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteUrl {
    /// Absolute page URL (`<loc>`)
    pub location: String,

    /// Opaque sortable timestamp (`<lastmod>`), empty when absent
    pub last_modified: String,

    /// Extracted page title, empty until the page has been crawled
    pub title: String,
}

impl SiteUrl {
    /// Creates an entry with an empty title
    pub fn new(location: impl Into<String>, last_modified: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            last_modified: last_modified.into(),
            title: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    loc: String,
    #[serde(default)]
    lastmod: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SitemapIndex {
    #[serde(rename = "sitemap", default)]
    sitemaps: Vec<SitemapIndexEntry>,
}

#[derive(Debug, Deserialize)]
struct SitemapIndexEntry {
    loc: String,
}

/// Returns true if the raw document looks like a sitemap index
///
/// This is a substring probe, not schema validation.
pub fn is_sitemap_index(raw: &[u8]) -> bool {
    raw.windows(SITEMAP_INDEX_MARKER.len())
        .any(|window| window == SITEMAP_INDEX_MARKER)
}

fn as_utf8<'a>(url: &str, raw: &'a [u8]) -> Result<&'a str, DigestError> {
    std::str::from_utf8(raw).map_err(|_| DigestError::Encoding {
        url: url.to_string(),
    })
}

/// Returns the local name of the document's first element, if any
fn root_element(xml: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(start) | Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                return Ok(Some(name));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Rejects a document whose root element is not `expected`
///
/// Serde decoding ignores the root name, so an HTML error page would
/// otherwise decode as an empty sitemap.
fn expect_root(url: &str, xml: &str, expected: &str) -> Result<(), DigestError> {
    let reason = match root_element(xml) {
        Ok(Some(root)) if root == expected => return Ok(()),
        Ok(Some(root)) => format!("expected <{}> root element, found <{}>", expected, root),
        Ok(None) => format!("expected <{}> root element, found none", expected),
        Err(e) => e.to_string(),
    };

    Err(DigestError::Sitemap {
        url: url.to_string(),
        source: DeError::Custom(reason),
    })
}

/// Decodes a `<urlset>` document into entries, preserving document order
///
/// # Arguments
///
/// * `url` - Where the document came from (for error reporting)
/// * `raw` - The raw document bytes
///
/// # Returns
///
/// * `Ok(Vec<SiteUrl>)` - One entry per `<url>`, titles empty
/// * `Err(DigestError)` - The document is not well-formed or its root is not `<urlset>`
pub fn decode_urlset(url: &str, raw: &[u8]) -> Result<Vec<SiteUrl>, DigestError> {
    let xml = as_utf8(url, raw)?;
    expect_root(url, xml, "urlset")?;

    let urlset: UrlSet =
        quick_xml::de::from_str(xml).map_err(|source| DigestError::Sitemap {
            url: url.to_string(),
            source,
        })?;

    Ok(urlset
        .urls
        .into_iter()
        .map(|entry| {
            SiteUrl::new(
                entry.loc.trim(),
                entry.lastmod.as_deref().unwrap_or_default().trim(),
            )
        })
        .collect())
}

/// Decodes a `<sitemapindex>` document into child sitemap locations
pub fn decode_sitemap_index(url: &str, raw: &[u8]) -> Result<Vec<String>, DigestError> {
    let xml = as_utf8(url, raw)?;
    expect_root(url, xml, "sitemapindex")?;

    let index: SitemapIndex =
        quick_xml::de::from_str(xml).map_err(|source| DigestError::Sitemap {
            url: url.to_string(),
            source,
        })?;

    Ok(index
        .sitemaps
        .into_iter()
        .map(|entry| entry.loc.trim().to_string())
        .collect())
}

/// Fetches a sitemap document and decodes it, flattening indexes
///
/// Child sitemaps of an index are fetched one after another in index order and
/// always decoded as `<urlset>` documents. Decode errors name the URL the
/// document was finally served from, after redirects.
pub async fn resolve_document(fetcher: &Fetcher, url: &str) -> Result<Vec<SiteUrl>, DigestError> {
    let document = fetcher.fetch(url).await?;

    if !is_sitemap_index(&document.body) {
        return decode_urlset(&document.final_url, &document.body);
    }

    let children = decode_sitemap_index(&document.final_url, &document.body)?;
    tracing::info!("{} is a sitemap index with {} children", url, children.len());

    let mut batch = Vec::new();
    for child in &children {
        let child_document = fetcher.fetch(child).await?;
        let entries = decode_urlset(&child_document.final_url, &child_document.body)?;
        tracing::debug!("Child sitemap {} lists {} pages", child, entries.len());
        batch.extend(entries);
    }

    Ok(batch)
}

/// Resolves the ordered page list of a site
///
/// # Arguments
///
/// * `fetcher` - The fetcher used for the sitemap and any child sitemaps
/// * `site` - The site base URL; `sitemap.xml` is appended after a `/`
///
/// # Returns
///
/// * `Ok(Vec<SiteUrl>)` - Entries in decode order
/// * `Err(DigestError)` - Transport failure or malformed XML
pub async fn resolve_sitemap(fetcher: &Fetcher, site: &str) -> Result<Vec<SiteUrl>, DigestError> {
    let target = sitemap_url(site);
    tracing::info!("Resolving sitemap {}", target);
    resolve_document(fetcher, &target).await
}
