//! Document intake channels.
//!
//! A [`DocumentSource`] produces named byte payloads for the batch
//! runner. The `list`/`fetch` split mirrors the failure taxonomy:
//! enumeration failures are container-scope and abort a run, while a
//! failure to read one listed document is recorded against that document
//! and the run continues.
//!
//! Three channels exist: [`DirectorySource`] (files directly inside a
//! directory), [`FileSetSource`] (named in-memory payloads, the
//! "uploaded files" shape), and [`ZipSource`] (archive entries at any
//! nesting depth).

mod archive;
mod directory;
mod files;

pub use archive::ZipSource;
pub use directory::DirectorySource;
pub use files::FileSetSource;

use crate::core::ExtractError;

/// A provider of named XML payloads in intake order.
pub trait DocumentSource {
    /// Enumerate candidate document names, filtered and ordered.
    /// An error here is a container failure and ends the run.
    fn list(&mut self) -> Result<Vec<String>, ExtractError>;

    /// Read one listed document's bytes. An error here is scoped to
    /// that document; the batch records it and moves on.
    fn fetch(&mut self, name: &str) -> Result<Vec<u8>, ExtractError>;
}

/// Final path component of a source name; ZIP entry paths and plain file
/// names both reduce to the bare file name records are tagged with.
pub fn file_label(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Case-insensitive `.xml` check on the final path component.
pub(crate) fn has_xml_extension(name: &str) -> bool {
    file_label(name).to_ascii_lowercase().ends_with(".xml")
}

/// macOS resource-fork companions (`._foo.xml`) that ZIP archives from
/// Finder tend to carry.
pub(crate) fn is_resource_fork(name: &str) -> bool {
    file_label(name).starts_with("._")
}
