//! Minimal `SpreadsheetML` writer.
//!
//! An `.xlsx` file is a zip archive of XML parts. This writer emits just enough
//! of them for a workbook of plain sheets: inline strings, numbers, a styled
//! header row per sheet and fixed column widths.

use crate::errors::Result;
use std::io::{Cursor, Write};
use zip::{ZipWriter, write::SimpleFileOptions};

/// MIME type of `.xlsx` documents.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Nothing written
    Empty,
    /// Inline string
    Text(String),
    /// Numeric value
    Number(f64),
}

impl Cell {
    fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Cell {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// A worksheet whose first row is a styled header.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    header_fill: String,
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Creates a sheet with a header row drawn in bold white on `header_fill`
    /// (an `RRGGBB` hex colour).
    #[must_use]
    pub fn new(name: &str, header_fill: &str, header: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            header_fill: header_fill.to_uppercase(),
            header: header.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a data row.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Sheet name as shown on its tab.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data rows, header excluded.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Width of each column: longest rendered value plus two.
    #[allow(clippy::cast_precision_loss)]
    fn column_widths(&self) -> Vec<f64> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|col| {
                let header = self.header.get(col).map_or(0, |h| h.chars().count());
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.display().chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(header);
                (longest + 2) as f64
            })
            .collect()
    }

    fn to_xml(&self, header_style: usize) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!(r#"<worksheet xmlns="{MAIN_NS}">"#));

        let widths = self.column_widths();
        if !widths.is_empty() {
            xml.push_str("<cols>");
            for (i, width) in widths.iter().enumerate() {
                let n = i + 1;
                xml.push_str(&format!(
                    r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#
                ));
            }
            xml.push_str("</cols>");
        }

        xml.push_str("<sheetData>");
        xml.push_str(r#"<row r="1">"#);
        for (col, title) in self.header.iter().enumerate() {
            xml.push_str(&format!(
                r#"<c r="{}1" t="inlineStr" s="{header_style}"><is><t xml:space="preserve">{}</t></is></c>"#,
                column_letter(col),
                escape_xml(title)
            ));
        }
        xml.push_str("</row>");

        for (i, row) in self.rows.iter().enumerate() {
            let r = i + 2;
            xml.push_str(&format!(r#"<row r="{r}">"#));
            for (col, cell) in row.iter().enumerate() {
                let reference = format!("{}{r}", column_letter(col));
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => xml.push_str(&format!(
                        r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        escape_xml(text)
                    )),
                    Cell::Number(n) => {
                        xml.push_str(&format!(r#"<c r="{reference}"><v>{n}</v></c>"#));
                    }
                }
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// An empty workbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Sheets in tab order.
    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Serializes the workbook into `.xlsx` bytes.
    ///
    /// # Errors
    /// Returns an error if the zip archive cannot be written.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml".to_string(), self.content_types_xml()),
            ("_rels/.rels".to_string(), root_rels_xml()),
            ("xl/workbook.xml".to_string(), self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels_xml()),
            ("xl/styles.xml".to_string(), self.styles_xml()),
        ];
        for (name, body) in parts {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }

        for (i, sheet) in self.sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
            // Style 0 is the default, header styles follow in sheet order
            zip.write_all(sheet.to_xml(i + 1).as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    fn content_types_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
        }
        xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        xml.push_str("</Types>");
        xml
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!(
            r#"<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>"#
        ));
        for (i, sheet) in self.sheets.iter().enumerate() {
            let n = i + 1;
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
                escape_xml(&sheet.name)
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn workbook_rels_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!(r#"<Relationships xmlns="{PKG_REL_NS}">"#));
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{i}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            ));
        }
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_NS}/styles" Target="styles.xml"/>"#,
            self.sheets.len() + 1
        ));
        xml.push_str("</Relationships>");
        xml
    }

    fn styles_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(&format!(r#"<styleSheet xmlns="{MAIN_NS}">"#));
        xml.push_str(concat!(
            r#"<fonts count="2">"#,
            r#"<font><sz val="11"/><name val="Calibri"/></font>"#,
            r#"<font><b/><sz val="11"/><color rgb="FFFFFFFF"/><name val="Calibri"/></font>"#,
            "</fonts>"
        ));

        xml.push_str(&format!(r#"<fills count="{}">"#, self.sheets.len() + 2));
        xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#);
        xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#);
        for sheet in &self.sheets {
            xml.push_str(&format!(
                r#"<fill><patternFill patternType="solid"><fgColor rgb="FF{0}"/><bgColor rgb="FF{0}"/></patternFill></fill>"#,
                sheet.header_fill
            ));
        }
        xml.push_str("</fills>");

        xml.push_str(concat!(
            r#"<borders count="2">"#,
            "<border><left/><right/><top/><bottom/><diagonal/></border>",
            r#"<border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border>"#,
            "</borders>"
        ));
        xml.push_str(
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        );

        xml.push_str(&format!(r#"<cellXfs count="{}">"#, self.sheets.len() + 1));
        xml.push_str(r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#);
        for i in 0..self.sheets.len() {
            xml.push_str(&format!(
                r#"<xf numFmtId="0" fontId="1" fillId="{}" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center"/></xf>"#,
                i + 2
            ));
        }
        xml.push_str("</cellXfs>");
        xml.push_str(
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
        );
        xml.push_str("</styleSheet>");
        xml
    }
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

/// Spreadsheet column name for a zero-based index: 0 → `A`, 25 → `Z`, 26 → `AA`.
#[must_use]
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// True for characters XML 1.0 cannot carry even as references.
const fn is_forbidden_in_xml(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Escapes markup characters and drops characters a worksheet part may not contain.
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_forbidden_in_xml(c) => {}
            c => escaped.push(c),
        }
    }
    escaped
}
