//! Ordered link list rendering
//!
//! Entries are ordered oldest first by their `lastmod` token and rendered as
//! an HTML `<ol>` fragment, one `<li>` per entry.

use crate::crawler::SiteUrl;

/// Sorts entries by last-modification token, ascending
///
/// The sort is stable: entries with equal tokens keep their decode order.
/// Tokens are compared as plain strings, which orders ISO-8601 timestamps
/// of the same shape chronologically.
pub fn sort_by_last_modified(batch: &mut [SiteUrl]) {
    batch.sort_by(|a, b| a.last_modified.cmp(&b.last_modified));
}

/// Renders entries as an ordered list of links, in the given order
///
/// Titles and locations are inserted verbatim, without escaping.
///
/// # Example
///
/// ```
/// use sitemap_digest::crawler::SiteUrl;
/// use sitemap_digest::output::render_list;
///
/// let mut entry = SiteUrl::new("https://ex.com/a.html", "2024-01-01");
/// entry.title = "A".to_string();
/// assert_eq!(
///     render_list(&[entry]),
///     "<ol>\n<li><a href=\"https://ex.com/a.html\">A</a></li>\n</ol>"
/// );
/// ```
pub fn render_list(batch: &[SiteUrl]) -> String {
    let mut html = String::from("<ol>\n");
    for entry in batch {
        html.push_str("<li><a href=\"");
        html.push_str(&entry.location);
        html.push_str("\">");
        html.push_str(&entry.title);
        html.push_str("</a></li>\n");
    }
    html.push_str("</ol>");
    html
}
