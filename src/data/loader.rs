//! Data Loader Module
//! Detects the upload format and reads CSV (Polars) or XLSX (calamine) bytes
//! into a Table.

use super::table::{RawColumn, Table};
use crate::error::{Result, SweepError};
use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
use polars::prelude::{CsvReadOptions, SerReader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A file handed over by the front-end: its name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// Upload formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Pick the format from the trailing extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" => Ok(SourceFormat::Xlsx),
            "" => Err(SweepError::UnsupportedFormat {
                extension: "(none)".to_string(),
            }),
            other => Err(SweepError::UnsupportedFormat {
                extension: format!(".{}", other),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Xlsx => "XLSX",
        }
    }
}

/// Reads uploads into tables.
pub struct DataLoader;

impl DataLoader {
    /// Sniff the format from the file name and parse the bytes.
    pub fn ingest(file: &UploadedFile) -> Result<Table> {
        let format = SourceFormat::from_file_name(file.name())?;
        debug!(file = %file.name(), format = format.label(), bytes = file.size(), "Parsing upload");

        let table = match format {
            SourceFormat::Csv => Self::read_csv(file.bytes())?,
            SourceFormat::Xlsx => Self::read_xlsx(file.bytes())?,
        };

        info!(
            file = %file.name(),
            format = format.label(),
            rows = table.height(),
            columns = table.width(),
            "Loaded file"
        );
        Ok(table)
    }

    /// Parse delimited text. The first record is the header.
    pub fn read_csv(bytes: &[u8]) -> Result<Table> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        // Schema inference is disabled so every field arrives as text; the
        // table applies its own numeric rule afterwards.
        let df = CsvReadOptions::default()
            .with_has_header(false)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| SweepError::malformed("CSV", e))?;

        if df.height() == 0 {
            return Err(SweepError::malformed("CSV", "no columns to parse from file"));
        }

        let fields = df
            .get_columns()
            .iter()
            .map(|column| {
                let values = column.as_materialized_series().str()?;
                Ok(values
                    .into_iter()
                    .map(|v| v.map(str::to_string))
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>>>()?;

        // Blank lines arrive as records with every field empty; drop them.
        let keep: Vec<bool> = (0..df.height())
            .map(|row| {
                row == 0
                    || fields
                        .iter()
                        .any(|column| column[row].as_deref().is_some_and(|v| !v.is_empty()))
            })
            .collect();
        let blank = keep.iter().filter(|k| !**k).count();
        if blank > 0 {
            debug!(blank, "Skipped blank CSV lines");
        }

        let columns = fields
            .into_iter()
            .map(|values| {
                let mut values = values
                    .into_iter()
                    .zip(&keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v);
                let header = values.next().flatten();
                RawColumn {
                    header,
                    cells: values.collect(),
                }
            })
            .collect();

        Table::from_raw(columns)
    }

    /// Parse the first worksheet of an Office Open XML workbook.
    pub fn read_xlsx(bytes: &[u8]) -> Result<Table> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e| SweepError::malformed("XLSX", e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SweepError::malformed("XLSX", "workbook has no worksheets"))?
            .map_err(|e| SweepError::malformed("XLSX", e))?;

        let rows: Vec<&[Data]> = range.rows().collect();
        let Some((header_row, data_rows)) = rows.split_first() else {
            return Ok(Table::empty());
        };

        let columns = header_row
            .iter()
            .enumerate()
            .map(|(idx, header)| RawColumn {
                header: Self::cell_text(header),
                cells: data_rows
                    .iter()
                    .map(|row| row.get(idx).and_then(Self::cell_text))
                    .collect(),
            })
            .collect();

        Table::from_raw(columns)
    }

    /// Render a worksheet cell as raw text; `None` for empty cells.
    fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty => None,
            Data::String(s) => Some(s.clone()),
            Data::Float(v) => Some(v.to_string()),
            Data::Int(v) => Some(v.to_string()),
            Data::Bool(v) => Some(v.to_string()),
            Data::DateTime(_) => cell
                .as_datetime()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            other => Some(other.to_string()),
        }
    }
}
