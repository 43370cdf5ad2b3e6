//! ZIP intake: XML entries anywhere inside an archive.

use std::io::{self, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::core::ExtractError;

use super::{has_xml_extension, is_resource_fork, DocumentSource};

/// Reads `*.xml` entries from a ZIP archive at any nesting depth,
/// in central-directory order. macOS resource-fork companions
/// (`._` basenames) are excluded.
///
/// A structurally unreadable archive surfaces as
/// [`ExtractError::InvalidArchive`] when the source is constructed;
/// per-entry read failures are scoped to the entry that caused them.
#[derive(Debug)]
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    /// Matching entries as (archive index, entry name), in
    /// central-directory order. Names may repeat.
    entries: Vec<(usize, String)>,
    /// Next entry a sequential fetch expects; keeps duplicate names
    /// from resolving to the same archive index twice.
    cursor: usize,
}

impl ZipSource<std::fs::File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let file = std::fs::File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self, ExtractError> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| ExtractError::InvalidArchive(e.to_string()))?;

        let mut entries = Vec::new();
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| ExtractError::InvalidArchive(e.to_string()))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name();
            if has_xml_extension(name) && !is_resource_fork(name) {
                entries.push((index, name.to_owned()));
            }
        }

        Ok(Self {
            archive,
            entries,
            cursor: 0,
        })
    }
}

impl<R: Read + Seek> DocumentSource for ZipSource<R> {
    fn list(&mut self) -> Result<Vec<String>, ExtractError> {
        self.cursor = 0;
        debug!(entries = self.entries.len(), "listed archive");
        Ok(self.entries.iter().map(|(_, name)| name.clone()).collect())
    }

    fn fetch(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        // A fetch in list order advances the cursor past the entry it
        // reads, so each occurrence of a repeated name gets its own
        // bytes. Out-of-order fetches fall back to the first match.
        let position = if self
            .entries
            .get(self.cursor)
            .is_some_and(|(_, n)| n == name)
        {
            self.cursor
        } else {
            self.entries
                .iter()
                .position(|(_, n)| n == name)
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {name}"))
                })?
        };
        self.cursor = position + 1;

        let index = self.entries[position].0;
        let mut entry = self.archive.by_index(index).map_err(io::Error::other)?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
