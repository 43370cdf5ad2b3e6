use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use releve::core::{DocumentStatus, ExtractError, ExtractionMode, ResultTable};
use releve::intake::ZipSource;
use releve::run_batch;
use releve::ubl::ubl_ns;

fn invoice(body: &str) -> String {
    format!(
        r#"<Invoice xmlns="{}" xmlns:cac="{}" xmlns:cbc="{}">{body}</Invoice>"#,
        ubl_ns::INVOICE,
        ubl_ns::CAC,
        ubl_ns::CBC,
    )
}

fn line(description: &str) -> String {
    format!(
        "<cac:InvoiceLine><cac:Item><cbc:Description>{description}</cbc:Description></cac:Item></cac:InvoiceLine>"
    )
}

fn archive_with(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, bytes) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    let mut cursor = zip.finish().unwrap();
    cursor.set_position(0);
    cursor
}

// ---------------------------------------------------------------------------
// Archive batches
// ---------------------------------------------------------------------------

#[test]
fn extracts_across_nested_entries_in_archive_order() {
    let doc_a = invoice(&line("from the march folder"));
    let doc_b = invoice(&line("from the root"));
    let cursor = archive_with(&[
        ("2024/march/a.xml", doc_a.as_bytes()),
        ("b.xml", doc_b.as_bytes()),
    ]);

    let mut source = ZipSource::new(cursor).unwrap();
    let result = run_batch(&mut source, ExtractionMode::Lines).unwrap();

    let ResultTable::Lines(rows) = &result.table else {
        panic!("expected a lines table");
    };
    assert_eq!(rows[0].description, "from the march folder");
    assert_eq!(rows[0].source_file, "a.xml");
    assert_eq!(rows[1].source_file, "b.xml");

    // The report keeps the full entry path; the records carry the label.
    assert_eq!(result.summary.files[0].file, "2024/march/a.xml");
}

#[test]
fn artifacts_are_excluded_and_malformed_entries_do_not_stop_the_run() {
    // A macOS-built archive: one good document, one broken one, and the
    // broken one's resource-fork companion.
    let doc_a = invoice(&format!("{}{}", line("row one"), line("row two")));
    let cursor = archive_with(&[
        ("a.xml", doc_a.as_bytes()),
        ("b.xml", b"<Invoice>no closing tag"),
        ("._b.xml", b"\x00\x05\x16\x07\x00\x02"),
    ]);

    let mut source = ZipSource::new(cursor).unwrap();
    let result = run_batch(&mut source, ExtractionMode::Lines).unwrap();

    // The artifact never shows up; the malformed entry is reported and
    // the good one still contributes both rows.
    assert_eq!(result.summary.attempted(), 2);
    assert_eq!(result.table.len(), 2);
    assert_eq!(result.summary.failed(), 1);

    let failures: Vec<&str> = result.summary.failures().map(|(name, _)| name).collect();
    assert_eq!(failures, vec!["b.xml"]);
}

#[test]
fn duplicate_entry_names_contribute_their_own_rows() {
    // Archives can legally carry two entries with the same name; each
    // occurrence is a document of its own.
    let first = invoice(&line("first copy"));
    let second = invoice(&line("second copy"));
    let cursor = archive_with(&[
        ("dup.xml", first.as_bytes()),
        ("dup.xml", second.as_bytes()),
    ]);

    let mut source = ZipSource::new(cursor).unwrap();
    let result = run_batch(&mut source, ExtractionMode::Lines).unwrap();

    assert_eq!(result.summary.attempted(), 2);
    let ResultTable::Lines(rows) = &result.table else {
        panic!("expected a lines table");
    };
    assert_eq!(rows[0].description, "first copy");
    assert_eq!(rows[1].description, "second copy");
}

#[test]
fn non_xml_entries_are_ignored() {
    let doc = invoice(&line("kept"));
    let cursor = archive_with(&[
        ("readme.txt", b"not an invoice"),
        ("report.pdf", b"%PDF-1.4"),
        ("invoice.xml", doc.as_bytes()),
    ]);

    let mut source = ZipSource::new(cursor).unwrap();
    let result = run_batch(&mut source, ExtractionMode::Lines).unwrap();

    assert_eq!(result.summary.attempted(), 1);
    assert_eq!(result.summary.files[0].file, "invoice.xml");
}

#[test]
fn an_unreadable_container_fails_before_any_document() {
    let err = ZipSource::new(Cursor::new(b"PK but not really".to_vec())).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidArchive(_)));
}

#[test]
fn totals_mode_over_an_archive() {
    let with_totals = invoice(
        "<cbc:ID>INV-1</cbc:ID>\
         <cac:LegalMonetaryTotal><cbc:PayableAmount>99.00</cbc:PayableAmount></cac:LegalMonetaryTotal>",
    );
    let without_totals = invoice("<cbc:ID>INV-2</cbc:ID>");
    let cursor = archive_with(&[
        ("one.xml", with_totals.as_bytes()),
        ("two.xml", without_totals.as_bytes()),
    ]);

    let mut source = ZipSource::new(cursor).unwrap();
    let result = run_batch(&mut source, ExtractionMode::Totals).unwrap();

    assert_eq!(result.table.len(), 1);
    assert_eq!(
        result.summary.files[1].status,
        DocumentStatus::Parsed { records: 0 }
    );

    let ResultTable::Totals(rows) = &result.table else {
        panic!("expected a totals table");
    };
    assert_eq!(rows[0].invoice_number, "INV-1");
    assert_eq!(rows[0].total_ttc, "99.00");
}

#[test]
fn empty_entries_are_skipped_not_failed() {
    let cursor = archive_with(&[("placeholder.xml", b"")]);

    let mut source = ZipSource::new(cursor).unwrap();
    let result = run_batch(&mut source, ExtractionMode::Lines).unwrap();

    assert_eq!(result.summary.files[0].status, DocumentStatus::Empty);
    assert_eq!(result.summary.failed(), 0);
}
