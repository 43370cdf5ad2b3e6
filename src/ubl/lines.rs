use super::scan::{self, Name, ScanSpec, Slot};
use crate::core::{ExtractError, LineRecord};

// Slot indices into LINE_SLOTS.
const DESCRIPTION: usize = 0;
const QUANTITY: usize = 1;
const GROSS_WEIGHT: usize = 2;
const NET_WEIGHT: usize = 3;
const WEIGHT_MEASURE: usize = 4;
const WEIGHT: usize = 5;
const UNIT_PRICE: usize = 6;
const LINE_TOTAL: usize = 7;
const DESIGNATION: usize = 8;

const LINE_SLOTS: [Slot; 9] = [
    Slot::text(&[Name::cac("Item"), Name::cbc("Description")]),
    Slot::text(&[Name::cbc("InvoicedQuantity")]),
    Slot::text(&[Name::cbc("GrossWeightMeasure")]),
    Slot::text(&[Name::cbc("NetWeightMeasure")]),
    Slot::text(&[Name::cbc("WeightMeasure")]),
    Slot::text(&[Name::cbc("Weight")]),
    Slot::text(&[Name::cac("Price"), Name::cbc("PriceAmount")]),
    Slot::text(&[Name::cbc("LineExtensionAmount")]),
    Slot::text(&[
        Name::cac("DespatchLineReference"),
        Name::cac("DocumentReference"),
        Name::cbc("ID"),
    ]),
];

const LINE_SCOPE: ScanSpec = ScanSpec {
    frame: Some(Name::cac("InvoiceLine")),
    slots: &LINE_SLOTS,
};

/// Weight candidates in precedence order. A candidate is consulted only
/// through its first element; empty text falls through to the next.
const WEIGHT_PRECEDENCE: &[usize] = &[GROSS_WEIGHT, NET_WEIGHT, WEIGHT_MEASURE, WEIGHT];

/// Extract one [`LineRecord`] per `cac:InvoiceLine` element, in document
/// order. A well-formed document with no lines yields an empty vector.
pub fn extract_lines(xml: &str, source_file: &str) -> Result<Vec<LineRecord>, ExtractError> {
    let frames = scan::scan(xml, &LINE_SCOPE)?;
    Ok(frames
        .into_iter()
        .map(|captures| LineRecord {
            description: scan::resolve(&captures, &[DESCRIPTION]),
            quantity: scan::resolve(&captures, &[QUANTITY]),
            weight: scan::resolve(&captures, WEIGHT_PRECEDENCE),
            unit_price: scan::resolve(&captures, &[UNIT_PRICE]),
            total: scan::resolve(&captures, &[LINE_TOTAL]),
            designation: scan::resolve(&captures, &[DESIGNATION]),
            source_file: source_file.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ubl::ubl_ns;

    fn doc(body: &str) -> String {
        format!(
            r#"<Invoice xmlns="{}" xmlns:cac="{}" xmlns:cbc="{}">{body}</Invoice>"#,
            ubl_ns::INVOICE,
            ubl_ns::CAC,
            ubl_ns::CBC,
        )
    }

    #[test]
    fn weight_prefers_gross_over_net() {
        let xml = doc(
            "<cac:InvoiceLine>\
               <cbc:NetWeightMeasure>10.0</cbc:NetWeightMeasure>\
               <cbc:GrossWeightMeasure>12.5</cbc:GrossWeightMeasure>\
             </cac:InvoiceLine>",
        );
        let records = extract_lines(&xml, "a.xml").unwrap();
        assert_eq!(records[0].weight, "12.5");
    }

    #[test]
    fn weight_skips_empty_candidates() {
        let xml = doc(
            "<cac:InvoiceLine>\
               <cbc:GrossWeightMeasure></cbc:GrossWeightMeasure>\
               <cbc:NetWeightMeasure>7.25</cbc:NetWeightMeasure>\
             </cac:InvoiceLine>",
        );
        let records = extract_lines(&xml, "a.xml").unwrap();
        assert_eq!(records[0].weight, "7.25");
    }

    #[test]
    fn empty_line_yields_empty_record() {
        let xml = doc("<cac:InvoiceLine/>");
        let records = extract_lines(&xml, "a.xml").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "");
        assert_eq!(records[0].source_file, "a.xml");
    }
}
