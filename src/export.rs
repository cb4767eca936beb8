//! Export Module
//! Serializes a table to CSV or XLSX in memory for download.
//!
//! XLSX output is written directly as ZIP/XML parts: one worksheet, a shared
//! string table and a minimal stylesheet with a bold header row.

use crate::data::{Cell, Table};
use crate::error::{Result, SweepError};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIP_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Target format for a download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Xlsx];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Xlsx => XLSX_MIME,
        }
    }

    /// Label shown on the format choice.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }
}

/// What to export: the format and the name of the file the table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub source_name: String,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, source_name: impl Into<String>) -> Self {
        Self {
            format,
            source_name: source_name.into(),
        }
    }

    /// Source name with its extension swapped for the target one.
    pub fn file_name(&self) -> String {
        let source = self.source_name.as_str();
        let stem = match Path::new(source).extension() {
            Some(ext) => &source[..source.len() - ext.len() - 1],
            None => source,
        };
        format!("{}.{}", stem, self.format.extension())
    }
}

/// An encoded table ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: &'static str,
}

/// Encodes tables into download buffers.
pub struct Exporter;

impl Exporter {
    pub fn export(table: &Table, request: &ExportRequest, sheet_name: &str) -> Result<ExportedFile> {
        let bytes = match request.format {
            ExportFormat::Csv => Self::to_csv(table)?,
            ExportFormat::Xlsx => Self::to_xlsx(table, sheet_name)?,
        };
        let file_name = request.file_name();

        debug!(
            file = %file_name,
            rows = table.height(),
            columns = table.width(),
            bytes = bytes.len(),
            "Exported table"
        );
        Ok(ExportedFile {
            bytes,
            file_name,
            mime: request.format.mime(),
        })
    }

    /// Comma-separated text: header row, then one line per row, no index.
    pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
        if table.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(table.column_names())
            .map_err(|e| SweepError::Export(e.to_string()))?;
        for row in table.rows()? {
            writer
                .write_record(row.iter().map(Cell::to_string))
                .map_err(|e| SweepError::Export(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| SweepError::Export(e.to_string()))
    }

    /// Single-worksheet Office Open XML workbook.
    pub fn to_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>> {
        let mut strings = SharedStrings::default();
        let sheet = Self::sheet_xml(table, &mut strings)?;
        Self::write_package(&sheet, &strings, sheet_name)
            .map_err(|e| SweepError::Export(e.to_string()))
    }

    fn write_package(sheet: &str, strings: &SharedStrings, sheet_name: &str) -> ZipResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 9] = [
            ("[Content_Types].xml", Self::content_types_xml()),
            ("_rels/.rels", Self::rels_xml()),
            ("docProps/app.xml", Self::app_props_xml()),
            ("docProps/core.xml", Self::core_props_xml()),
            ("xl/workbook.xml", Self::workbook_xml(sheet_name)),
            ("xl/_rels/workbook.xml.rels", Self::workbook_rels_xml()),
            ("xl/styles.xml", Self::styles_xml()),
            ("xl/sharedStrings.xml", strings.to_xml()),
            ("xl/worksheets/sheet1.xml", sheet.to_string()),
        ];

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    fn sheet_xml(table: &Table, strings: &mut SharedStrings) -> Result<String> {
        let width = table.width();
        let dimension = if width == 0 {
            "A1".to_string()
        } else {
            format!("A1:{}{}", column_letter(width - 1), table.height() + 1)
        };

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(r#"<worksheet xmlns="{}">"#, SPREADSHEET_NS));
        xml.push_str(&format!(r#"<dimension ref="{}"/>"#, dimension));

        if width == 0 {
            xml.push_str("<sheetData/></worksheet>");
            return Ok(xml);
        }

        xml.push_str("<sheetData>");

        // Header row uses style 1 (bold).
        xml.push_str(r#"<row r="1">"#);
        for (col, name) in table.column_names().iter().enumerate() {
            let idx = strings.index_of(name);
            xml.push_str(&format!(
                r#"<c r="{}1" t="s" s="1"><v>{}</v></c>"#,
                column_letter(col),
                idx
            ));
        }
        xml.push_str("</row>");

        for (row_idx, row) in table.rows()?.iter().enumerate() {
            let r = row_idx + 2;
            xml.push_str(&format!(r#"<row r="{}">"#, r));
            for (col, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", column_letter(col), r);
                match cell {
                    Cell::Missing => {}
                    Cell::Number(v) if v.is_finite() => {
                        xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, v));
                    }
                    // Spreadsheets cannot hold infinities as numbers.
                    Cell::Number(v) => {
                        let idx = strings.index_of(&v.to_string());
                        xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, idx));
                    }
                    Cell::Text(s) => {
                        let idx = strings.index_of(s);
                        xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, idx));
                    }
                }
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        Ok(xml)
    }

    fn content_types_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#
            .to_string()
    }

    fn rels_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
            .to_string()
    }

    fn app_props_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>Data Sweeper</Application>
</Properties>"#
            .to_string()
    }

    fn core_props_xml() -> String {
        let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:creator>Data Sweeper</dc:creator>
<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>
<dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified>
</cp:coreProperties>"#
        )
    }

    fn workbook_xml(sheet_name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="{}">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
            SPREADSHEET_NS,
            RELATIONSHIP_NS,
            escape(xml_safe(sheet_name).as_str())
        )
    }

    fn workbook_rels_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#
            .to_string()
    }

    fn styles_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="{}">
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#,
            SPREADSHEET_NS
        )
    }
}

/// Workbook-wide string table, deduplicated in first-use order.
#[derive(Default)]
struct SharedStrings {
    order: Vec<String>,
    index: HashMap<String, usize>,
    references: usize,
}

impl SharedStrings {
    fn index_of(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(idx) = self.index.get(value) {
            return *idx;
        }
        let idx = self.order.len();
        self.order.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        idx
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="{}" count="{}" uniqueCount="{}">"#,
            SPREADSHEET_NS,
            self.references,
            self.order.len()
        );
        for value in &self.order {
            xml.push_str(&format!(
                r#"<si><t xml:space="preserve">{}</t></si>"#,
                escape(xml_safe(value).as_str())
            ));
        }
        xml.push_str("</sst>");
        xml
    }
}

/// Drop characters XML 1.0 cannot carry (control characters other than
/// tab, newline and carriage return).
fn xml_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r') || *c >= ' ')
        .collect()
}

/// Zero-based column index to spreadsheet letters: 0 -> A, 26 -> AA.
fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}
