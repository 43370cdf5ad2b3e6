//! Batch runner: folds every document a source lists into one table.

use tracing::{debug, warn};

use crate::core::{
    DocumentStatus, ExtractError, ExtractionMode, FileReport, ResultTable, RunSummary,
};
use crate::intake::{file_label, DocumentSource};
use crate::ubl::{extract_lines, extract_totals};

/// Output of one batch pass: the accumulated table plus the
/// per-document report front ends build their summaries from.
#[derive(Debug)]
pub struct BatchResult {
    pub table: ResultTable,
    pub summary: RunSummary,
}

/// Runs one extraction pass over every document the source lists.
///
/// Only enumeration failures abort the run; anything wrong with a single
/// document (unreadable payload, malformed XML, invalid encoding) is
/// recorded against that document and the fold moves on. The table keeps
/// intake order across documents and document order within each one.
pub fn run_batch<S: DocumentSource>(
    source: &mut S,
    mode: ExtractionMode,
) -> Result<BatchResult, ExtractError> {
    let names = source.list()?;
    debug!(documents = names.len(), ?mode, "starting batch");

    let mut table = ResultTable::new(mode);
    let mut summary = RunSummary::default();
    for name in names {
        let status = process_one(source, &name, &mut table);
        match &status {
            DocumentStatus::Parsed { records } => {
                debug!(file = %name, records, "document parsed");
            }
            DocumentStatus::Empty => debug!(file = %name, "empty payload skipped"),
            DocumentStatus::ParseFailed(msg) | DocumentStatus::ProcessingFailed(msg) => {
                warn!(file = %name, error = %msg, "document skipped");
            }
        }
        summary.files.push(FileReport { file: name, status });
    }

    Ok(BatchResult { table, summary })
}

fn process_one<S: DocumentSource>(
    source: &mut S,
    name: &str,
    table: &mut ResultTable,
) -> DocumentStatus {
    let bytes = match source.fetch(name) {
        Ok(bytes) => bytes,
        Err(e) => return DocumentStatus::ProcessingFailed(e.to_string()),
    };
    if bytes.is_empty() {
        return DocumentStatus::Empty;
    }
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => return DocumentStatus::ParseFailed(e.to_string()),
    };

    let label = file_label(name);
    match table {
        ResultTable::Lines(rows) => match extract_lines(&text, label) {
            Ok(records) => {
                let count = records.len();
                rows.extend(records);
                DocumentStatus::Parsed { records: count }
            }
            Err(e) => DocumentStatus::ParseFailed(e.to_string()),
        },
        ResultTable::Totals(rows) => match extract_totals(&text, label) {
            Ok(Some(record)) => {
                rows.push(record);
                DocumentStatus::Parsed { records: 1 }
            }
            Ok(None) => DocumentStatus::Parsed { records: 0 },
            Err(e) => DocumentStatus::ParseFailed(e.to_string()),
        },
    }
}
