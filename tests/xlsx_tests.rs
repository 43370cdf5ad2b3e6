use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use releve::core::{ExtractionMode, LineRecord, ResultTable, TotalsRecord};
use releve::intake::FileSetSource;
use releve::run_batch;
use releve::ubl::ubl_ns;
use releve::xlsx::{write_xlsx, xlsx_bytes};

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Read the single worksheet back: (sheet name, rows as strings).
fn read_back(bytes: &[u8]) -> (String, Vec<Vec<String>>) {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    let (name, range) = workbook.worksheets().into_iter().next().unwrap();

    let (height, width) = range.get_size();
    let mut rows = Vec::with_capacity(height);
    for r in 0..height {
        let mut row = Vec::with_capacity(width);
        for c in 0..width {
            row.push(cell_text(range.get_value((r as u32, c as u32))));
        }
        rows.push(row);
    }
    (name, rows)
}

fn line(description: &str, quantity: &str) -> String {
    format!(
        "<cac:InvoiceLine>\
           <cbc:InvoicedQuantity>{quantity}</cbc:InvoicedQuantity>\
           <cac:Item><cbc:Description>{description}</cbc:Description></cac:Item>\
         </cac:InvoiceLine>"
    )
}

fn invoice(body: &str) -> String {
    format!(
        r#"<Invoice xmlns="{}" xmlns:cac="{}" xmlns:cbc="{}">{body}</Invoice>"#,
        ubl_ns::INVOICE,
        ubl_ns::CAC,
        ubl_ns::CBC,
    )
}

// ---------------------------------------------------------------------------
// Round trip through calamine
// ---------------------------------------------------------------------------

#[test]
fn lines_workbook_round_trips() {
    let xml = invoice(&format!("{}{}", line("Steel bolts M8", "250"), line("Washers", "1000")));
    let mut source = FileSetSource::new();
    source.push("invoice.xml", xml.into_bytes());

    let result = run_batch(&mut source, ExtractionMode::Lines).unwrap();
    let bytes = xlsx_bytes(&result.table).unwrap();

    let (sheet, rows) = read_back(&bytes);
    assert_eq!(sheet, "InvoiceData");
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        vec!["Description", "Quantity", "Weight", "UnitPrice", "Total", "Designation", "SourceFile"]
    );
    assert_eq!(rows[1][0], "Steel bolts M8");
    assert_eq!(rows[1][1], "250");
    assert_eq!(rows[1][6], "invoice.xml");
    assert_eq!(rows[2][0], "Washers");
}

#[test]
fn awkward_strings_survive_the_round_trip() {
    let record = LineRecord {
        description: " leading and trailing ".into(),
        quantity: "12,50".into(),
        weight: "a\nmultiline\nvalue".into(),
        unit_price: "<&>\"'".into(),
        total: "h\u{e9}llo \u{fc} \u{20ac}".into(),
        designation: "".into(),
        source_file: "weird.xml".into(),
    };
    let table = ResultTable::Lines(vec![record.clone()]);
    let bytes = xlsx_bytes(&table).unwrap();

    let (_, rows) = read_back(&bytes);
    let expected: Vec<String> = record.cells().iter().map(|c| c.to_string()).collect();
    assert_eq!(rows[1], expected);
}

#[test]
fn duplicate_values_come_back_in_every_cell() {
    // Shared-string interning must not collapse rows.
    let rows_in: Vec<LineRecord> = (0..3)
        .map(|_| LineRecord {
            description: "same".into(),
            source_file: "same".into(),
            ..LineRecord::default()
        })
        .collect();
    let bytes = xlsx_bytes(&ResultTable::Lines(rows_in)).unwrap();

    let (_, rows) = read_back(&bytes);
    assert_eq!(rows.len(), 4);
    for row in &rows[1..] {
        assert_eq!(row[0], "same");
        assert_eq!(row[6], "same");
    }
}

#[test]
fn totals_workbook_uses_its_own_sheet() {
    let record = TotalsRecord {
        invoice_number: "INV-2024-0117".into(),
        total_ht: "1000.00".into(),
        total_ttc: "1190.00".into(),
        tax_amount: "190.00".into(),
        currency: "EUR".into(),
        source_file: "invoice.xml".into(),
    };
    let bytes = xlsx_bytes(&ResultTable::Totals(vec![record])).unwrap();

    let (sheet, rows) = read_back(&bytes);
    assert_eq!(sheet, "InvoiceTotals");
    assert_eq!(
        rows[0],
        vec!["InvoiceNumber", "TotalHT", "TotalTTC", "TaxAmount", "Currency", "SourceFile"]
    );
    assert_eq!(rows[1][0], "INV-2024-0117");
    assert_eq!(rows[1][4], "EUR");
}

#[test]
fn empty_table_still_has_the_header_row() {
    let bytes = xlsx_bytes(&ResultTable::new(ExtractionMode::Lines)).unwrap();
    let (sheet, rows) = read_back(&bytes);
    assert_eq!(sheet, "InvoiceData");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Description");
}

// ---------------------------------------------------------------------------
// File output
// ---------------------------------------------------------------------------

#[test]
fn write_xlsx_produces_a_readable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("xml_out.xlsx");

    let table = ResultTable::Lines(vec![LineRecord {
        description: "on disk".into(),
        ..LineRecord::default()
    }]);
    write_xlsx(&table, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
    let (_, rows) = read_back(&bytes);
    assert_eq!(rows[1][0], "on disk");
}
