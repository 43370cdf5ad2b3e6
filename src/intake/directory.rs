//! Directory intake: XML files directly inside one directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::ExtractError;

use super::{has_xml_extension, DocumentSource};

/// Reads `*.xml` files (case-insensitive) from a single directory.
/// Subdirectories are not descended into. Names are listed in sorted
/// order so runs over the same directory are deterministic.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DocumentSource for DirectorySource {
    fn list(&mut self) -> Result<Vec<String>, ExtractError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if has_xml_extension(&name) {
                names.push(name);
            }
        }
        names.sort();
        debug!(dir = %self.root.display(), files = names.len(), "listed directory");
        Ok(names)
    }

    fn fetch(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        Ok(std::fs::read(self.root.join(name))?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
