//! Archive reading: a downloaded zip container becomes a flat entry listing.
//!
//! Entries come out in the container's native order; the assembler re-sorts
//! by path, so nothing downstream depends on zip ordering. Directory entries
//! are dropped here. Content stays as raw bytes until classification decides
//! whether decoding is worthwhile.

use std::io::{Cursor, Read};

use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("the downloaded file is not a valid zip archive: {0}")]
    InvalidArchive(String),
}

/// One file inside the archive. Immutable for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: String,
    pub raw_bytes: Vec<u8>,
}

/// Open the archive and list every file entry.
pub fn open_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ArchiveError::InvalidArchive(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ArchiveError::InvalidArchive(e.to_string()))?;
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        let mut raw_bytes = Vec::with_capacity(file.size() as usize);
        if let Err(e) = file.read_to_end(&mut raw_bytes) {
            // A corrupt member is skipped; the container itself was readable.
            warn!(path = %path, error = %e, "Failed to read archive entry, skipping");
            continue;
        }
        entries.push(ArchiveEntry { path, raw_bytes });
    }

    debug!(entries = entries.len(), "Archive listing complete");
    Ok(entries)
}
