//! HTML parser for extracting a page's post title
//!
//! Titles are not taken from `<title>`: blog engines decorate that with the
//! blog name. Instead the first heading carrying the post-title class is used.

use crate::config::TitleConfig;
use scraper::{ElementRef, Html};

/// Describes the element that carries a page's title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRule {
    tag: String,
    class: String,
}

impl TitleRule {
    /// Creates a rule matching `<tag class="class">`
    pub fn new(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            class: class.into(),
        }
    }

    /// Builds the rule from the title section of the configuration
    pub fn from_config(config: &TitleConfig) -> Self {
        Self::new(config.tag.as_str(), config.class.as_str())
    }

    /// Tests a single element: tag name must match and the `class` attribute
    /// must equal the rule's class exactly (not merely contain it)
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        value.name() == self.tag && value.attr("class") == Some(self.class.as_str())
    }
}

impl Default for TitleRule {
    fn default() -> Self {
        Self::from_config(&TitleConfig::default())
    }
}

/// Text content of an element with newline characters removed
fn heading_text(element: &ElementRef<'_>) -> String {
    element.text().flat_map(|chunk| chunk.chars()).filter(|c| *c != '\n').collect()
}

/// Finds the title in a parsed document
///
/// Walks the tree depth-first in document order, testing each node before its
/// children. The first matching element with non-empty text wins and the rest
/// of the tree is not visited. No match yields an empty string.
///
/// # Arguments
///
/// * `document` - The parsed HTML document
/// * `rule` - Which element carries the title
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use sitemap_digest::crawler::{extract_title, TitleRule};
///
/// let html = r#"<html><body><h3 class="post-title entry-title">
/// Hello
/// </h3></body></html>"#;
/// let document = Html::parse_document(html);
/// assert_eq!(extract_title(&document, &TitleRule::default()), "Hello");
/// ```
pub fn extract_title(document: &Html, rule: &TitleRule) -> String {
    // `descendants` is a pre-order traversal backed by the tree's sibling links,
    // so deeply nested documents do not grow the call stack.
    document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| rule.matches(element))
        .map(|element| heading_text(&element))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Parses raw page bytes and extracts the title
///
/// Invalid UTF-8 is replaced rather than rejected; HTML parsing itself never fails.
pub fn page_title(raw: &[u8], rule: &TitleRule) -> String {
    let document = Html::parse_document(&String::from_utf8_lossy(raw));
    extract_title(&document, rule)
}
