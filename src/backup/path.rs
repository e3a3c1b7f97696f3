use crate::url::sanitize_host;
use crate::DigestError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Directory receiving one site's backups for one day: `<root>/<host>/<YYYY-MM-DD>`
pub fn backup_dir(root: &Path, host: &str, date: NaiveDate) -> PathBuf {
    root.join(host).join(date.format("%Y-%m-%d").to_string())
}

/// Creates a directory and all missing parents
pub fn ensure_dir(dir: &Path) -> Result<(), DigestError> {
    std::fs::create_dir_all(dir).map_err(|source| DigestError::Backup {
        path: dir.to_path_buf(),
        source,
    })
}

/// Flattens a page URL into a file name
///
/// `://` is removed and every `/` becomes `_`, e.g.
/// `https://ex.com/2024/01/a.html` -> `httpsex.com_2024_01_a.html`.
pub fn backup_file_name(url: &str) -> String {
    url.replace("://", "").replace('/', "_")
}

/// Name of the per-site archive: `<YYYY-MM-DD>_<host>_archive.zip`
pub fn archive_file_name(date: NaiveDate, host: &str) -> String {
    format!(
        "{}_{}_archive.zip",
        date.format("%Y-%m-%d"),
        sanitize_host(host)
    )
}
