//! Workbook output.
//!
//! Builds the `.xlsx` package directly: a ZIP container holding the
//! handful of OOXML parts a single-sheet string workbook needs. Cell
//! values land in the spreadsheet exactly as the extractors captured
//! them, with no numeric reinterpretation.

mod sheet;

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use chrono::Utc;
use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::core::{ExtractError, ResultTable};

use sheet::SharedStrings;

fn zip_err(e: zip::result::ZipError) -> ExtractError {
    ExtractError::Workbook(format!("ZIP write error: {e}"))
}

/// Write the table as an `.xlsx` file on disk.
///
/// # Example
///
/// ```no_run
/// use releve::core::{ExtractionMode, ResultTable};
/// use releve::xlsx::write_xlsx;
///
/// let table = ResultTable::new(ExtractionMode::Lines);
/// write_xlsx(&table, "xml_out.xlsx")?;
/// # Ok::<(), releve::core::ExtractError>(())
/// ```
pub fn write_xlsx<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<(), ExtractError> {
    let file = std::fs::File::create(path)?;
    write_xlsx_to_writer(table, file)
}

/// Write the table to any [`Write`] + [`Seek`] destination.
pub fn write_xlsx_to_writer<W: Write + Seek>(
    table: &ResultTable,
    writer: W,
) -> Result<(), ExtractError> {
    let mut strings = SharedStrings::default();
    let worksheet = sheet::worksheet_xml(table, &mut strings)?;
    let shared_strings = strings.to_xml()?;

    let mut zip = ZipWriter::new(writer);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)
        .map_err(zip_err)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", options).map_err(zip_err)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("docProps/core.xml", options)
        .map_err(zip_err)?;
    zip.write_all(core_properties_xml().as_bytes())?;

    zip.start_file("xl/workbook.xml", options).map_err(zip_err)?;
    zip.write_all(workbook_xml(table.sheet_name()).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)
        .map_err(zip_err)?;
    zip.write_all(WORKBOOK_RELS.as_bytes())?;

    zip.start_file("xl/styles.xml", options).map_err(zip_err)?;
    zip.write_all(STYLES.as_bytes())?;

    zip.start_file("xl/worksheets/sheet1.xml", options)
        .map_err(zip_err)?;
    zip.write_all(worksheet.as_bytes())?;

    zip.start_file("xl/sharedStrings.xml", options)
        .map_err(zip_err)?;
    zip.write_all(shared_strings.as_bytes())?;

    zip.finish().map_err(zip_err)?;

    debug!(rows = table.len(), sheet = table.sheet_name(), "workbook written");
    Ok(())
}

/// Render the workbook in memory, for callers that hand the bytes on
/// (download responses, further archiving) instead of touching disk.
pub fn xlsx_bytes(table: &ResultTable) -> Result<Vec<u8>, ExtractError> {
    let mut buffer = Cursor::new(Vec::new());
    write_xlsx_to_writer(table, &mut buffer)?;
    Ok(buffer.into_inner())
}

// ---------------------------------------------------------------------------
// Static package parts
// ---------------------------------------------------------------------------

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
    <fills count="1"><fill><patternFill patternType="none"/></fill></fills>
    <borders count="1"><border/></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
</styleSheet>"#;

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{sheet_name}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#
    )
}

fn core_properties_xml() -> String {
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:creator>releve</dc:creator>
    <cp:lastModifiedBy>releve</cp:lastModifiedBy>
    <dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created>
    <dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>
</cp:coreProperties>"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
