use super::scan::{self, Name, ScanSpec, Slot};
use crate::core::{ExtractError, TotalsRecord};

const LMT: Name = Name::cac("LegalMonetaryTotal");

// Slot indices into TOTALS_SLOTS.
const INVOICE_NUMBER: usize = 0;
const TOTAL_HT: usize = 1;
const TTC_INCLUSIVE: usize = 2;
const TTC_PAYABLE: usize = 3;
const TAX_EXCLUSIVE: usize = 4;
const TAX_TOTAL: usize = 5;
const DOC_CURRENCY: usize = 6;
const CUR_INCLUSIVE: usize = 7;
const CUR_PAYABLE: usize = 8;
const CUR_LINE_EXTENSION: usize = 9;
const CUR_TAX_EXCLUSIVE: usize = 10;
const CUR_TAX_TOTAL: usize = 11;

const TOTALS_SLOTS: [Slot; 12] = [
    Slot::text(&[Name::cbc("ID")]),
    Slot::text(&[LMT, Name::cbc("LineExtensionAmount")]),
    Slot::text(&[LMT, Name::cbc("TaxInclusiveAmount")]),
    Slot::text(&[LMT, Name::cbc("PayableAmount")]),
    Slot::text(&[LMT, Name::cbc("TaxExclusiveAmount")]),
    Slot::text(&[Name::cac("TaxTotal"), Name::cbc("TaxAmount")]),
    Slot::text(&[Name::cbc("DocumentCurrencyCode")]),
    Slot::attr(&[LMT, Name::cbc("TaxInclusiveAmount")], "currencyID"),
    Slot::attr(&[LMT, Name::cbc("PayableAmount")], "currencyID"),
    Slot::attr(&[LMT, Name::cbc("LineExtensionAmount")], "currencyID"),
    Slot::attr(&[LMT, Name::cbc("TaxExclusiveAmount")], "currencyID"),
    Slot::attr(&[Name::cac("TaxTotal"), Name::cbc("TaxAmount")], "currencyID"),
];

const DOC_SCOPE: ScanSpec = ScanSpec {
    frame: None,
    slots: &TOTALS_SLOTS,
};

/// Tax-inclusive total, falling back to the payable amount.
const TTC_PRECEDENCE: &[usize] = &[TTC_INCLUSIVE, TTC_PAYABLE];

/// The first candidate is the tax-exclusive (net) total, not a tax
/// amount; kept for output parity with the legacy extraction.
const TAX_PRECEDENCE: &[usize] = &[TAX_EXCLUSIVE, TAX_TOTAL];

/// Explicit currency code first, then `currencyID` attributes on the
/// monetary nodes, TTC-first.
const CURRENCY_PRECEDENCE: &[usize] = &[
    DOC_CURRENCY,
    CUR_INCLUSIVE,
    CUR_PAYABLE,
    CUR_LINE_EXTENSION,
    CUR_TAX_EXCLUSIVE,
    CUR_TAX_TOTAL,
];

/// Extract the document's monetary totals, or `None` when neither a net
/// (HT) nor a tax-inclusive (TTC) total is present — such documents are
/// parsed but contribute no record.
pub fn extract_totals(xml: &str, source_file: &str) -> Result<Option<TotalsRecord>, ExtractError> {
    let mut frames = scan::scan(xml, &DOC_SCOPE)?;
    let captures = frames.pop().unwrap_or_default();

    let total_ht = scan::resolve(&captures, &[TOTAL_HT]);
    let total_ttc = scan::resolve(&captures, TTC_PRECEDENCE);
    if total_ht.is_empty() && total_ttc.is_empty() {
        return Ok(None);
    }

    Ok(Some(TotalsRecord {
        invoice_number: scan::resolve(&captures, &[INVOICE_NUMBER]),
        total_ht,
        total_ttc,
        tax_amount: scan::resolve(&captures, TAX_PRECEDENCE),
        currency: scan::resolve(&captures, CURRENCY_PRECEDENCE),
        source_file: source_file.to_string(),
    }))
}
