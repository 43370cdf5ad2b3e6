use thiserror::Error;

/// Errors that can occur while reading inputs or writing the workbook.
///
/// Per-document problems (empty payloads, malformed XML, unreadable
/// entries) are *not* errors at the batch level; they surface as
/// [`DocumentStatus`](crate::core::DocumentStatus) values in the run
/// summary. This enum covers the failures that end a run: container
/// problems and output problems.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// Filesystem error while listing or reading inputs, or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload is not well-formed XML (also used for per-document
    /// classification before it becomes a report entry).
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The ZIP container itself cannot be opened or enumerated.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Workbook assembly or serialization failed.
    #[error("workbook error: {0}")]
    Workbook(String),
}
