//! Worksheet and shared-string parts.

use std::collections::HashMap;
use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::core::{ExtractError, ResultTable};

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

type PartWriter = Writer<Cursor<Vec<u8>>>;

fn write_err(e: std::io::Error) -> ExtractError {
    ExtractError::Workbook(format!("XML write error: {e}"))
}

/// An indenting writer primed with the XML declaration every part opens
/// with.
fn part_writer() -> Result<PartWriter, ExtractError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;
    Ok(writer)
}

fn finish_part(writer: PartWriter) -> Result<String, ExtractError> {
    let buf = writer.into_inner().into_inner();
    String::from_utf8(buf).map_err(|e| ExtractError::Workbook(format!("XML UTF-8 error: {e}")))
}

/// Shared-string table. Every cell value is interned here and the
/// worksheet references it by index, the way spreadsheet applications
/// write string-typed workbooks.
#[derive(Default)]
pub(crate) struct SharedStrings {
    lookup: HashMap<String, usize>,
    strings: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(&index) = self.lookup.get(value) {
            return index;
        }
        let index = self.strings.len();
        self.lookup.insert(value.to_owned(), index);
        self.strings.push(value.to_owned());
        index
    }

    /// The `xl/sharedStrings.xml` part. Strings with whitespace at
    /// either edge (or embedded line breaks) keep it via
    /// `xml:space="preserve"`.
    pub(crate) fn to_xml(&self) -> Result<String, ExtractError> {
        let mut xml = part_writer()?;

        let mut sst = BytesStart::new("sst");
        sst.push_attribute(("xmlns", SPREADSHEET_NS));
        sst.push_attribute(("count", self.references.to_string().as_str()));
        sst.push_attribute(("uniqueCount", self.strings.len().to_string().as_str()));
        xml.write_event(Event::Start(sst)).map_err(write_err)?;

        for value in &self.strings {
            xml.write_event(Event::Start(BytesStart::new("si")))
                .map_err(write_err)?;
            let mut t = BytesStart::new("t");
            if needs_preserve(value) {
                t.push_attribute(("xml:space", "preserve"));
            }
            xml.write_event(Event::Start(t)).map_err(write_err)?;
            xml.write_event(Event::Text(BytesText::new(value)))
                .map_err(write_err)?;
            xml.write_event(Event::End(BytesEnd::new("t")))
                .map_err(write_err)?;
            xml.write_event(Event::End(BytesEnd::new("si")))
                .map_err(write_err)?;
        }

        xml.write_event(Event::End(BytesEnd::new("sst")))
            .map_err(write_err)?;
        finish_part(xml)
    }
}

fn needs_preserve(value: &str) -> bool {
    value.trim() != value || value.contains('\n')
}

/// The `xl/worksheets/sheet1.xml` part. Row 1 carries the column
/// headers; data rows follow in table order. Every cell, empty string
/// included, is a shared-string reference so the captured text survives
/// a round trip without numeric reinterpretation.
pub(crate) fn worksheet_xml(
    table: &ResultTable,
    strings: &mut SharedStrings,
) -> Result<String, ExtractError> {
    let mut xml = part_writer()?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SPREADSHEET_NS));
    xml.write_event(Event::Start(worksheet)).map_err(write_err)?;
    xml.write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(write_err)?;

    write_row(&mut xml, 1, table.columns().iter().copied(), strings)?;
    for (i, row) in table.rows().into_iter().enumerate() {
        write_row(&mut xml, i + 2, row.into_iter(), strings)?;
    }

    xml.write_event(Event::End(BytesEnd::new("sheetData")))
        .map_err(write_err)?;
    xml.write_event(Event::End(BytesEnd::new("worksheet")))
        .map_err(write_err)?;
    finish_part(xml)
}

/// One `<row>` of string-typed (`t="s"`) cells whose `<v>` values are
/// shared-string indices.
fn write_row<'a>(
    xml: &mut PartWriter,
    number: usize,
    cells: impl Iterator<Item = &'a str>,
    strings: &mut SharedStrings,
) -> Result<(), ExtractError> {
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", number.to_string().as_str()));
    xml.write_event(Event::Start(row)).map_err(write_err)?;

    for (column, value) in cells.enumerate() {
        let reference = format!("{}{number}", col_letter(column));
        let mut cell = BytesStart::new("c");
        cell.push_attribute(("r", reference.as_str()));
        cell.push_attribute(("t", "s"));
        xml.write_event(Event::Start(cell)).map_err(write_err)?;

        let index = strings.intern(value).to_string();
        xml.write_event(Event::Start(BytesStart::new("v")))
            .map_err(write_err)?;
        xml.write_event(Event::Text(BytesText::new(&index)))
            .map_err(write_err)?;
        xml.write_event(Event::End(BytesEnd::new("v")))
            .map_err(write_err)?;
        xml.write_event(Event::End(BytesEnd::new("c")))
            .map_err(write_err)?;
    }

    xml.write_event(Event::End(BytesEnd::new("row")))
        .map_err(write_err)?;
    Ok(())
}

/// Spreadsheet column letters for a zero-based column index:
/// 0 is `A`, 25 is `Z`, 26 is `AA`.
fn col_letter(mut index: usize) -> String {
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
