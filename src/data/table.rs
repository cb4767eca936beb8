//! Table Module
//! Column-typed in-memory table backed by a Polars DataFrame.
//!
//! Every column is either numeric (`Float64`) or text (`String`); nulls mark
//! missing cells. Types are inferred here rather than by the file readers so
//! CSV and Excel uploads follow the same rule.

use crate::error::{Result, SweepError};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Raw cell values treated as missing, in addition to blank cells.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "number",
            ColumnKind::Text => "text",
        }
    }
}

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Missing, Into::into)
    }
}

impl fmt::Display for Cell {
    /// Numbers use plain decimal notation (`1`, `2.5`), missing cells are empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Missing => Ok(()),
        }
    }
}

/// An untyped column as read from a file: the header cell plus data cells.
#[derive(Debug, Clone, Default)]
pub struct RawColumn {
    pub header: Option<String>,
    pub cells: Vec<Option<String>>,
}

/// Ordered, uniquely named columns with a shared row count.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
}

impl Table {
    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            df: DataFrame::empty(),
        }
    }

    /// Build a table from raw text cells, inferring each column's kind.
    ///
    /// Header names are made unique and short columns are padded with
    /// missing cells so every column has the same length.
    pub fn from_raw(columns: Vec<RawColumn>) -> Result<Self> {
        let height = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
        let names = normalize_headers(columns.iter().map(|c| c.header.clone()).collect());

        let columns = columns
            .into_iter()
            .zip(names)
            .map(|(mut raw, name)| {
                raw.cells.resize(height, None);
                infer_column(&name, &raw.cells)
            })
            .collect();

        Self::from_columns(columns)
    }

    /// Build a table from typed cells. A column whose present cells are all
    /// numbers becomes numeric; anything else becomes text.
    pub fn from_cells<S: AsRef<str>>(columns: Vec<(S, Vec<Cell>)>) -> Result<Self> {
        let columns = columns
            .into_iter()
            .map(|(name, cells)| {
                let name = name.as_ref();
                let all_numeric = cells
                    .iter()
                    .all(|c| matches!(c, Cell::Number(_) | Cell::Missing));
                if all_numeric {
                    let values: Vec<Option<f64>> = cells.iter().map(Cell::as_f64).collect();
                    Column::new(name.into(), values)
                } else {
                    let values: Vec<Option<String>> = cells
                        .iter()
                        .map(|c| (!c.is_missing()).then(|| c.to_string()))
                        .collect();
                    Column::new(name.into(), values)
                }
            })
            .collect();

        Self::from_columns(columns)
    }

    /// Wrap already-typed columns. Fails on duplicate names or unequal lengths.
    pub(crate) fn from_columns(columns: Vec<Column>) -> Result<Self> {
        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Inferred kind of a column, `None` if the column does not exist.
    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.df.column(name).ok().map(|c| kind_of(c.dtype()))
    }

    /// Names of the numeric columns, in table order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|c| kind_of(c.dtype()) == ColumnKind::Numeric)
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Values of a numeric column; `None` entries are missing cells.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self
            .df
            .column(name)
            .map_err(|_| SweepError::ColumnNotFound(name.to_string()))?;
        Ok(column.f64()?.into_iter().collect())
    }

    /// All cells of one column.
    pub fn column_cells(&self, name: &str) -> Result<Vec<Cell>> {
        let column = self
            .df
            .column(name)
            .map_err(|_| SweepError::ColumnNotFound(name.to_string()))?;
        cells_of(column)
    }

    /// Row-major copy of every cell.
    pub fn rows(&self) -> Result<Vec<Vec<Cell>>> {
        let columns = self
            .df
            .get_columns()
            .iter()
            .map(cells_of)
            .collect::<Result<Vec<_>>>()?;

        let rows = (0..self.height())
            .map(|row| columns.iter().map(|cells| cells[row].clone()).collect())
            .collect();
        Ok(rows)
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            df: self.df.head(Some(n)),
        }
    }

    /// Keep the rows where `keep` is true.
    pub(crate) fn filter_rows(&self, keep: &[bool]) -> Result<Table> {
        let mask = BooleanChunked::from_slice(PlSmallStr::from_static("keep"), keep);
        Ok(Table {
            df: self.df.filter(&mask)?,
        })
    }

    pub(crate) fn columns(&self) -> &[Column] {
        self.df.get_columns()
    }

    pub(crate) fn column(&self, name: &str) -> Result<&Column> {
        self.df
            .column(name)
            .map_err(|_| SweepError::ColumnNotFound(name.to_string()))
    }
}

impl PartialEq for Table {
    /// Same names, kinds and cells; missing equals missing.
    fn eq(&self, other: &Self) -> bool {
        if self.column_names() != other.column_names() || self.height() != other.height() {
            return false;
        }
        let same_kinds = self
            .columns()
            .iter()
            .zip(other.columns())
            .all(|(a, b)| kind_of(a.dtype()) == kind_of(b.dtype()));
        same_kinds
            && matches!((self.rows(), other.rows()), (Ok(a), Ok(b)) if a == b)
    }
}

fn kind_of(dtype: &DataType) -> ColumnKind {
    if matches!(dtype, DataType::Float64) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

fn cells_of(column: &Column) -> Result<Vec<Cell>> {
    if kind_of(column.dtype()) == ColumnKind::Numeric {
        Ok(column.f64()?.into_iter().map(Cell::from).collect())
    } else {
        let values = column.as_materialized_series().str()?;
        Ok(values.into_iter().map(Cell::from).collect())
    }
}

/// True for blank cells and the conventional missing-value markers.
pub fn is_missing_marker(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

/// Parse a raw cell as a number. NaN never counts as a number.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Numeric if every present cell parses as a number, text otherwise.
fn infer_column(name: &str, cells: &[Option<String>]) -> Column {
    let present: Vec<Option<&str>> = cells
        .iter()
        .map(|c| c.as_deref().filter(|s| !is_missing_marker(s)))
        .collect();

    let numbers: Option<Vec<Option<f64>>> = present
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(raw) => parse_number(raw).map(Some),
        })
        .collect();

    match numbers {
        Some(values) => Column::new(name.into(), values),
        None => {
            let values: Vec<Option<String>> =
                present.iter().map(|c| c.map(str::to_string)).collect();
            Column::new(name.into(), values)
        }
    }
}

/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2`, ...
fn normalize_headers(headers: Vec<Option<String>>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();

    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = header
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| format!("Unnamed: {}", idx));

            let mut name = base.clone();
            while used.contains(&name) {
                let counter = counters.entry(base.clone()).or_insert(0);
                *counter += 1;
                name = format!("{}.{}", base, counter);
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(header: &str, cells: &[&str]) -> RawColumn {
        RawColumn {
            header: Some(header.to_string()),
            cells: cells
                .iter()
                .map(|c| (!c.is_empty()).then(|| c.to_string()))
                .collect(),
        }
    }

    #[test]
    fn infers_numeric_and_text_columns() {
        let table = Table::from_raw(vec![
            raw("id", &["a1", "a2", "a3"]),
            raw("score", &["1.5", "", "3"]),
            raw("mixed", &["1", "two", "3"]),
        ])
        .unwrap();

        assert_eq!(table.kind("id"), Some(ColumnKind::Text));
        assert_eq!(table.kind("score"), Some(ColumnKind::Numeric));
        assert_eq!(table.kind("mixed"), Some(ColumnKind::Text));
        assert_eq!(
            table.numeric_values("score").unwrap(),
            vec![Some(1.5), None, Some(3.0)]
        );
    }

    #[test]
    fn missing_markers_do_not_block_numeric_inference() {
        let table = Table::from_raw(vec![raw("v", &["1", "NA", "n/a", " ", "2"])]).unwrap();
        assert_eq!(table.kind("v"), Some(ColumnKind::Numeric));
        assert_eq!(
            table.numeric_values("v").unwrap(),
            vec![Some(1.0), None, None, None, Some(2.0)]
        );
    }

    #[test]
    fn all_missing_column_is_numeric() {
        let table = Table::from_raw(vec![raw("empty", &["", "", ""])]).unwrap();
        assert_eq!(table.kind("empty"), Some(ColumnKind::Numeric));
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn text_markers_become_missing() {
        let table = Table::from_raw(vec![raw("name", &["bob", "null", "amy"])]).unwrap();
        assert_eq!(
            table.column_cells("name").unwrap(),
            vec![Cell::from("bob"), Cell::Missing, Cell::from("amy")]
        );
    }

    #[test]
    fn headers_are_made_unique() {
        let table = Table::from_raw(vec![
            raw("a", &["1"]),
            raw("a", &["2"]),
            RawColumn {
                header: None,
                cells: vec![Some("3".into())],
            },
            raw("a", &["4"]),
        ])
        .unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn short_columns_are_padded() {
        let table =
            Table::from_raw(vec![raw("a", &["1", "2", "3"]), raw("b", &["x"])]).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.column_cells("b").unwrap(),
            vec![Cell::from("x"), Cell::Missing, Cell::Missing]
        );
    }

    #[test]
    fn from_cells_rejects_duplicate_names() {
        let result = Table::from_cells(vec![
            ("a", vec![Cell::Number(1.0)]),
            ("a", vec![Cell::Number(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn from_cells_rejects_uneven_columns() {
        let result = Table::from_cells(vec![
            ("a", vec![Cell::Number(1.0), Cell::Number(2.0)]),
            ("b", vec![Cell::Number(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cell_display_uses_plain_decimals() {
        assert_eq!(Cell::Number(1.0).to_string(), "1");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Missing.to_string(), "");
        assert_eq!(Cell::from("x").to_string(), "x");
    }

    #[test]
    fn rows_and_head() {
        let table = Table::from_cells(vec![
            ("n", vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Missing]),
            ("t", vec![Cell::from("a"), Cell::Missing, Cell::from("c")]),
        ])
        .unwrap();

        let rows = table.rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![Cell::Number(2.0), Cell::Missing]);

        let head = table.head(2);
        assert_eq!(head.height(), 2);
        assert_eq!(head.column_names(), table.column_names());
    }
}
