//! File-set intake: named in-memory payloads.

use std::io;

use crate::core::ExtractError;

use super::{has_xml_extension, DocumentSource};

/// A caller-assembled set of named payloads, typically files received
/// over an upload boundary. Names keep their given order; non-XML names
/// are dropped at enumeration time like in the other channels.
#[derive(Default)]
pub struct FileSetSource {
    files: Vec<(String, Vec<u8>)>,
}

impl FileSetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.push((name.into(), bytes.into()));
    }
}

impl DocumentSource for FileSetSource {
    fn list(&mut self) -> Result<Vec<String>, ExtractError> {
        Ok(self
            .files
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| has_xml_extension(name))
            .collect())
    }

    fn fetch(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no such payload: {name}")).into()
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
