use serde::Serialize;

/// Which extraction pass runs over each document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionMode {
    /// One row per `cac:InvoiceLine` element.
    Lines,
    /// One row per document, summarizing its monetary totals.
    Totals,
}

/// One extracted invoice line.
///
/// Every field is the literal text of the first matching element within
/// the line's subtree — no trimming, no numeric parsing. Missing data is
/// the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    /// `cac:Item/cbc:Description`.
    pub description: String,
    /// `cbc:InvoicedQuantity`.
    pub quantity: String,
    /// First non-empty of the weight fallback chain (gross, net, measure, plain).
    pub weight: String,
    /// `cac:Price/cbc:PriceAmount`.
    pub unit_price: String,
    /// `cbc:LineExtensionAmount`.
    pub total: String,
    /// `cac:DespatchLineReference/cac:DocumentReference/cbc:ID`.
    pub designation: String,
    /// File name of the document this line came from.
    pub source_file: String,
}

impl LineRecord {
    /// Column headers, in output order.
    pub const COLUMNS: [&'static str; 7] = [
        "Description",
        "Quantity",
        "Weight",
        "UnitPrice",
        "Total",
        "Designation",
        "SourceFile",
    ];

    /// Cell values in [`Self::COLUMNS`] order.
    pub fn cells(&self) -> [&str; 7] {
        [
            &self.description,
            &self.quantity,
            &self.weight,
            &self.unit_price,
            &self.total,
            &self.designation,
            &self.source_file,
        ]
    }
}

/// Per-document monetary totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TotalsRecord {
    /// First `cbc:ID` anywhere in the document.
    pub invoice_number: String,
    /// `cac:LegalMonetaryTotal/cbc:LineExtensionAmount` (net of tax).
    pub total_ht: String,
    /// `cbc:TaxInclusiveAmount`, falling back to `cbc:PayableAmount`.
    pub total_ttc: String,
    /// `cbc:TaxExclusiveAmount`, falling back to `cac:TaxTotal/cbc:TaxAmount`.
    /// The first candidate is a net total, not a tax; kept for output
    /// parity with the legacy extraction.
    pub tax_amount: String,
    /// `cbc:DocumentCurrencyCode`, falling back to `currencyID` attributes.
    pub currency: String,
    /// File name of the source document.
    pub source_file: String,
}

impl TotalsRecord {
    /// Column headers, in output order.
    pub const COLUMNS: [&'static str; 6] = [
        "InvoiceNumber",
        "TotalHT",
        "TotalTTC",
        "TaxAmount",
        "Currency",
        "SourceFile",
    ];

    /// Cell values in [`Self::COLUMNS`] order.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.invoice_number,
            &self.total_ht,
            &self.total_ttc,
            &self.tax_amount,
            &self.currency,
            &self.source_file,
        ]
    }
}

/// Accumulated extraction output: records in intake order, line order
/// within each document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResultTable {
    Lines(Vec<LineRecord>),
    Totals(Vec<TotalsRecord>),
}

impl ResultTable {
    /// An empty table for the given mode.
    pub fn new(mode: ExtractionMode) -> Self {
        match mode {
            ExtractionMode::Lines => ResultTable::Lines(Vec::new()),
            ExtractionMode::Totals => ResultTable::Totals(Vec::new()),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        match self {
            ResultTable::Lines(_) => ExtractionMode::Lines,
            ResultTable::Totals(_) => ExtractionMode::Totals,
        }
    }

    /// Number of data rows (excluding the header).
    pub fn len(&self) -> usize {
        match self {
            ResultTable::Lines(rows) => rows.len(),
            ResultTable::Totals(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column headers for this table's mode.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ResultTable::Lines(_) => &LineRecord::COLUMNS,
            ResultTable::Totals(_) => &TotalsRecord::COLUMNS,
        }
    }

    /// Worksheet name used when serializing.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            ResultTable::Lines(_) => "InvoiceData",
            ResultTable::Totals(_) => "InvoiceTotals",
        }
    }

    /// All data rows as cell slices, row-major.
    pub fn rows(&self) -> Vec<Vec<&str>> {
        match self {
            ResultTable::Lines(rows) => rows.iter().map(|r| r.cells().to_vec()).collect(),
            ResultTable::Totals(rows) => rows.iter().map(|r| r.cells().to_vec()).collect(),
        }
    }
}

/// Terminal state of one document after a batch pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocumentStatus {
    /// Zero-byte payload; skipped before parsing.
    Empty,
    /// Not well-formed XML; skipped, message kept for the report.
    ParseFailed(String),
    /// The payload could not be read or processed at all.
    ProcessingFailed(String),
    /// Well-formed; `records` rows contributed to the table (may be 0).
    Parsed { records: usize },
}

impl DocumentStatus {
    /// True for both failure variants (parse and processing).
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DocumentStatus::ParseFailed(_) | DocumentStatus::ProcessingFailed(_)
        )
    }

    /// The captured failure message, if this is a failure state.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            DocumentStatus::ParseFailed(msg) | DocumentStatus::ProcessingFailed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// One document's name and terminal state, in intake order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Source name as enumerated (ZIP entries keep their inner path).
    pub file: String,
    pub status: DocumentStatus,
}

/// Everything a front end needs to report on a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Per-document reports, in intake order.
    pub files: Vec<FileReport>,
}

impl RunSummary {
    /// Documents the run looked at, including skips and failures.
    pub fn attempted(&self) -> usize {
        self.files.len()
    }

    /// Documents that parsed (with or without records).
    pub fn parsed(&self) -> usize {
        self.files
            .iter()
            .filter(|r| matches!(r.status, DocumentStatus::Parsed { .. }))
            .count()
    }

    /// Documents that parsed and contributed at least one record.
    pub fn with_records(&self) -> usize {
        self.files
            .iter()
            .filter(|r| matches!(r.status, DocumentStatus::Parsed { records } if records > 0))
            .count()
    }

    /// Documents that parsed but contained nothing extractable.
    pub fn without_records(&self) -> usize {
        self.files
            .iter()
            .filter(|r| matches!(r.status, DocumentStatus::Parsed { records: 0 }))
            .count()
    }

    /// Zero-byte documents skipped before parsing.
    pub fn skipped_empty(&self) -> usize {
        self.files
            .iter()
            .filter(|r| r.status == DocumentStatus::Empty)
            .count()
    }

    /// Failed documents as (name, message) pairs, in intake order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .filter_map(|r| r.status.failure_message().map(|msg| (r.file.as_str(), msg)))
    }

    /// Count of failed documents.
    pub fn failed(&self) -> usize {
        self.files.iter().filter(|r| r.status.is_failure()).count()
    }

    /// True when at least one document was attempted and every one failed.
    pub fn all_failed(&self) -> bool {
        !self.files.is_empty() && self.failed() == self.attempted()
    }
}
