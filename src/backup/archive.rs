use crate::backup::ArchiveSet;
use crate::DigestError;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes every retained page into a single deflated ZIP file
///
/// Entry order follows the map's iteration order and is not meaningful.
///
/// # Arguments
///
/// * `path` - Destination of the archive; an existing file is replaced
/// * `entries` - File name to raw bytes
pub fn write_archive(path: &Path, entries: &ArchiveSet) -> Result<(), DigestError> {
    let file = File::create(path).map_err(|source| DigestError::Backup {
        path: path.to_path_buf(),
        source,
    })?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)?;
    }

    zip.finish()?;
    Ok(())
}
