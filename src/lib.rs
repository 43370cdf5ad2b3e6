//! # releve
//!
//! Batch extraction of line items and monetary totals from UBL invoice
//! XML into `.xlsx` workbooks. Documents come in from a directory, a set
//! of named payloads, or a ZIP archive; one malformed document never
//! takes down the rest of the run.
//!
//! Extracted values are the literal element text — no trimming, no
//! numeric parsing — so the workbook shows exactly what the XML said.
//!
//! ## Quick Start
//!
//! ```rust
//! use releve::batch::run_batch;
//! use releve::core::ExtractionMode;
//! use releve::intake::FileSetSource;
//! use releve::xlsx::xlsx_bytes;
//!
//! let xml = r#"<?xml version="1.0"?>
//! <Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
//!          xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
//!          xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
//!   <cac:InvoiceLine>
//!     <cbc:InvoicedQuantity>5</cbc:InvoicedQuantity>
//!     <cac:Item><cbc:Description>Steel bolts</cbc:Description></cac:Item>
//!   </cac:InvoiceLine>
//! </Invoice>"#;
//!
//! let mut source = FileSetSource::new();
//! source.push("invoice.xml", xml.as_bytes());
//!
//! let result = run_batch(&mut source, ExtractionMode::Lines)?;
//! assert_eq!(result.table.len(), 1);
//! assert_eq!(result.summary.parsed(), 1);
//!
//! let workbook = xlsx_bytes(&result.table)?;
//! assert_eq!(&workbook[..2], b"PK");
//! # Ok::<(), releve::core::ExtractError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cli` (default) | The `releve` command-line binary |

pub mod batch;
pub mod core;
pub mod intake;
pub mod ubl;
pub mod xlsx;

// Re-export the common types and the runner at crate root for convenience
pub use crate::batch::{run_batch, BatchResult};
pub use crate::core::*;
