//! UBL invoice field extraction.
//!
//! Lookups address elements by namespace URI plus local name, so
//! documents extract identically whatever prefixes they declare
//! (including default-namespace declarations). Binding different URIs to
//! the same local names yields empty fields, never an error.
//!
//! # Example
//!
//! ```
//! use releve::ubl::{extract_lines, ubl_ns};
//!
//! let xml = format!(
//!     r#"<Invoice xmlns="{}" xmlns:cac="{}" xmlns:cbc="{}">
//!          <cac:InvoiceLine>
//!            <cbc:InvoicedQuantity>3</cbc:InvoicedQuantity>
//!            <cac:Item><cbc:Description>Bolts</cbc:Description></cac:Item>
//!          </cac:InvoiceLine>
//!        </Invoice>"#,
//!     ubl_ns::INVOICE,
//!     ubl_ns::CAC,
//!     ubl_ns::CBC,
//! );
//! let records = extract_lines(&xml, "inv.xml").unwrap();
//! assert_eq!(records[0].description, "Bolts");
//! assert_eq!(records[0].quantity, "3");
//! ```

mod lines;
mod scan;
mod totals;

pub use lines::extract_lines;
pub use totals::extract_totals;

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}
