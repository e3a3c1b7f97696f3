//! Backup module for raw page persistence
//!
//! This module handles:
//! - Deriving the dated per-site backup directory and file names
//! - Writing raw page bytes as they are crawled
//! - Bundling a site's backed-up pages into a single ZIP archive

mod archive;
mod path;
mod sink;

pub use archive::write_archive;
pub use path::{archive_file_name, backup_dir, backup_file_name, ensure_dir};
pub use sink::BackupSink;

use std::collections::HashMap;

/// Backed-up pages retained for archiving, keyed by backup file name
pub type ArchiveSet = HashMap<String, Vec<u8>>;
