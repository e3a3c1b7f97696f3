use crate::backup::archive::write_archive;
use crate::backup::path::backup_file_name;
use crate::backup::ArchiveSet;
use crate::DigestError;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Persists raw page bytes for one site crawl
///
/// Every stored page is written to the backup directory and also retained in
/// memory so the whole set can be bundled into one archive once the crawl is
/// done. The sink is shared by all page workers of a site.
#[derive(Debug)]
pub struct BackupSink {
    dir: PathBuf,
    page_suffix: String,
    entries: Mutex<ArchiveSet>,
}

impl BackupSink {
    /// Creates a sink writing into `dir`, which must already exist
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory receiving the page files and the archive
    /// * `page_suffix` - Only URLs whose path ends with this are stored
    pub fn new(dir: impl Into<PathBuf>, page_suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            page_suffix: page_suffix.into(),
            entries: Mutex::new(ArchiveSet::new()),
        }
    }

    /// Directory receiving the page files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns true if the URL names a page that should be backed up
    ///
    /// Sitemaps and other non-page resources never qualify.
    pub fn accepts(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => parsed.path().ends_with(&self.page_suffix),
            Err(_) => url.ends_with(&self.page_suffix),
        }
    }

    /// Stores a page's raw bytes
    ///
    /// # Arguments
    ///
    /// * `raw` - The page body as fetched
    /// * `url` - The page location, used for gating and naming
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The page was written and retained for the archive
    /// * `Ok(false)` - The URL is not a page; nothing was done
    /// * `Err(DigestError)` - Writing the file failed
    pub async fn store(&self, raw: &[u8], url: &str) -> Result<bool, DigestError> {
        if !self.accepts(url) {
            return Ok(false);
        }

        let name = backup_file_name(url);
        let path = self.dir.join(&name);
        let to_backup_error = |source: std::io::Error| DigestError::Backup {
            path: path.clone(),
            source,
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Other platforms keep their default permissions
        #[cfg(unix)]
        options.mode(0o644);

        let mut file = options.open(&path).await.map_err(to_backup_error)?;
        file.write_all(raw).await.map_err(to_backup_error)?;
        file.flush().await.map_err(to_backup_error)?;

        tracing::debug!("Backed up {} to {}", url, path.display());

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, raw.to_vec());

        Ok(true)
    }

    /// Number of pages retained for the archive
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no page has been retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bundles all retained pages into `<dir>/<file_name>`
    ///
    /// Must only be called after every worker has finished storing. The
    /// retained entries are drained, so a second call writes nothing.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - The archive that was written
    /// * `Ok(None)` - Nothing was retained; no archive was created
    /// * `Err(DigestError)` - Creating the archive failed
    pub fn finalize(&self, file_name: &str) -> Result<Option<PathBuf>, DigestError> {
        let entries = std::mem::take(
            &mut *self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        if entries.is_empty() {
            return Ok(None);
        }

        let path = self.dir.join(file_name);
        write_archive(&path, &entries)?;
        tracing::info!("Archived {} pages to {}", entries.len(), path.display());

        Ok(Some(path))
    }
}
