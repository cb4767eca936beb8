//! Data Processor Module
//! Handles data cleaning (deduplication, mean imputation) and column projection.

use super::table::{Cell, Table};
use crate::error::Result;
use polars::prelude::Column;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashSet;
use tracing::debug;

/// Cleaning toggles chosen per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningOptions {
    /// Drop rows that repeat an earlier row.
    pub deduplicate: bool,
    /// Fill missing numeric cells with the column mean.
    pub impute_missing: bool,
}

impl CleaningOptions {
    pub fn is_noop(&self) -> bool {
        !self.deduplicate && !self.impute_missing
    }
}

/// Hashable form of a cell used to compare whole rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey {
    Number(u64),
    Text(String),
    Missing,
}

impl From<&Cell> for CellKey {
    fn from(cell: &Cell) -> Self {
        match cell {
            // -0.0 and 0.0 compare equal as numbers, so they share a key.
            Cell::Number(v) if *v == 0.0 => CellKey::Number(0f64.to_bits()),
            Cell::Number(v) => CellKey::Number(v.to_bits()),
            Cell::Text(s) => CellKey::Text(s.clone()),
            Cell::Missing => CellKey::Missing,
        }
    }
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Apply the enabled cleaning steps: deduplicate first, then impute.
    pub fn clean(table: &Table, options: CleaningOptions) -> Result<Table> {
        let mut table = table.clone();
        if options.is_noop() {
            return Ok(table);
        }
        if options.deduplicate {
            table = Self::deduplicate(&table)?;
        }
        if options.impute_missing {
            table = Self::impute_missing_with_mean(&table)?;
        }
        Ok(table)
    }

    /// Remove rows that exactly repeat an earlier row, keeping the first
    /// occurrence. Missing cells compare equal to each other.
    pub fn deduplicate(table: &Table) -> Result<Table> {
        let rows = table.rows()?;
        let mut seen: HashSet<Vec<CellKey>> = HashSet::with_capacity(rows.len());

        let keep: Vec<bool> = rows
            .iter()
            .map(|row| seen.insert(row.iter().map(CellKey::from).collect()))
            .collect();

        let removed = keep.iter().filter(|k| !**k).count();
        debug!(rows = rows.len(), removed, "Removed duplicate rows");

        if removed == 0 {
            return Ok(table.clone());
        }
        table.filter_rows(&keep)
    }

    /// Replace missing cells of each numeric column with the mean of its
    /// present values. Text columns and columns with no present values are
    /// returned unchanged, so no NaN ever enters the table.
    pub fn impute_missing_with_mean(table: &Table) -> Result<Table> {
        let numeric: HashSet<String> = table.numeric_column_names().into_iter().collect();
        let mut filled_cells = 0usize;

        let columns = table
            .columns()
            .iter()
            .map(|column| {
                if !numeric.contains(column.name().as_str()) {
                    return Ok(column.clone());
                }

                let values: Vec<Option<f64>> = column.f64()?.into_iter().collect();
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                if present.is_empty() || present.len() == values.len() {
                    return Ok(column.clone());
                }

                let mean = present.iter().mean();
                // inf and -inf together average to NaN; leave the gaps missing.
                if mean.is_nan() {
                    return Ok(column.clone());
                }
                filled_cells += values.len() - present.len();
                let filled: Vec<Option<f64>> =
                    values.into_iter().map(|v| v.or(Some(mean))).collect();
                Ok(Column::new(column.name().clone(), filled))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(filled_cells, "Filled missing values with column means");
        Table::from_columns(columns)
    }

    /// Keep exactly the named columns, in the order given.
    ///
    /// An empty selection yields an empty table; an unknown name is an error.
    pub fn select_columns<S: AsRef<str>>(table: &Table, wanted: &[S]) -> Result<Table> {
        if wanted.is_empty() {
            debug!("Empty column selection");
            return Ok(Table::empty());
        }

        let columns = wanted
            .iter()
            .map(|name| table.column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;

        debug!(
            kept = columns.len(),
            dropped = table.width().saturating_sub(columns.len()),
            "Selected columns"
        );
        Table::from_columns(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnKind;
    use crate::error::SweepError;

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn t(s: &str) -> Cell {
        Cell::from(s)
    }

    fn sample() -> Table {
        Table::from_cells(vec![
            ("id", vec![t("a"), t("b"), t("a"), t("c"), t("b")]),
            ("v", vec![n(1.0), n(2.0), n(1.0), Cell::Missing, n(2.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn deduplicate_keeps_first_occurrences_in_order() {
        let deduped = DataProcessor::deduplicate(&sample()).unwrap();
        assert_eq!(
            deduped.rows().unwrap(),
            vec![
                vec![t("a"), n(1.0)],
                vec![t("b"), n(2.0)],
                vec![t("c"), Cell::Missing],
            ]
        );
    }

    #[test]
    fn deduplicate_is_idempotent() {
        let once = DataProcessor::deduplicate(&sample()).unwrap();
        let twice = DataProcessor::deduplicate(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn deduplicate_treats_missing_as_equal() {
        let table = Table::from_cells(vec![
            ("a", vec![Cell::Missing, Cell::Missing, n(1.0)]),
            ("b", vec![t("x"), t("x"), t("x")]),
        ])
        .unwrap();
        let deduped = DataProcessor::deduplicate(&table).unwrap();
        assert_eq!(deduped.height(), 2);
    }

    #[test]
    fn deduplicate_without_duplicates_is_noop() {
        let table = Table::from_cells(vec![("a", vec![n(1.0), n(2.0), n(3.0)])]).unwrap();
        assert_eq!(DataProcessor::deduplicate(&table).unwrap(), table);
    }

    #[test]
    fn impute_fills_with_mean() {
        let table = Table::from_cells(vec![("v", vec![n(2.0), Cell::Missing, n(4.0)])]).unwrap();
        let filled = DataProcessor::impute_missing_with_mean(&table).unwrap();
        assert_eq!(
            filled.numeric_values("v").unwrap(),
            vec![Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn impute_leaves_all_missing_column_missing() {
        let table = Table::from_cells(vec![
            ("empty", vec![Cell::Missing, Cell::Missing]),
            ("v", vec![n(1.0), Cell::Missing]),
        ])
        .unwrap();
        let filled = DataProcessor::impute_missing_with_mean(&table).unwrap();

        assert_eq!(filled.kind("empty"), Some(ColumnKind::Numeric));
        assert_eq!(filled.numeric_values("empty").unwrap(), vec![None, None]);
        assert_eq!(
            filled.numeric_values("v").unwrap(),
            vec![Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn impute_skips_column_whose_mean_is_nan() {
        let table = Table::from_cells(vec![(
            "v",
            vec![n(f64::INFINITY), n(f64::NEG_INFINITY), Cell::Missing],
        )])
        .unwrap();
        let filled = DataProcessor::impute_missing_with_mean(&table).unwrap();
        assert_eq!(
            filled.numeric_values("v").unwrap(),
            vec![Some(f64::INFINITY), Some(f64::NEG_INFINITY), None]
        );
    }

    #[test]
    fn impute_leaves_text_columns_untouched() {
        let table = Table::from_cells(vec![
            ("name", vec![t("x"), Cell::Missing, t("z")]),
            ("v", vec![n(1.0), Cell::Missing, n(5.0)]),
        ])
        .unwrap();
        let filled = DataProcessor::impute_missing_with_mean(&table).unwrap();

        assert_eq!(
            filled.column_cells("name").unwrap(),
            table.column_cells("name").unwrap()
        );
        assert_eq!(
            filled.numeric_values("v").unwrap(),
            vec![Some(1.0), Some(3.0), Some(5.0)]
        );
    }

    #[test]
    fn clean_applies_dedupe_before_impute() {
        let table = Table::from_cells(vec![
            ("a", vec![n(1.0), n(1.0), n(3.0)]),
            ("b", vec![n(2.0), n(2.0), Cell::Missing]),
        ])
        .unwrap();
        let options = CleaningOptions {
            deduplicate: true,
            impute_missing: true,
        };
        let cleaned = DataProcessor::clean(&table, options).unwrap();

        // The duplicate (1, 2) is gone before the mean of b is taken.
        assert_eq!(cleaned.height(), 2);
        assert_eq!(
            cleaned.numeric_values("b").unwrap(),
            vec![Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn clean_with_no_options_is_noop() {
        let table = sample();
        let cleaned = DataProcessor::clean(&table, CleaningOptions::default()).unwrap();
        assert_eq!(cleaned, table);
    }

    #[test]
    fn select_all_columns_in_order_is_noop() {
        let table = sample();
        let selected = DataProcessor::select_columns(&table, &table.column_names()).unwrap();
        assert_eq!(selected, table);
    }

    #[test]
    fn select_reorders_and_drops() {
        let table = sample();
        let selected = DataProcessor::select_columns(&table, &["v"]).unwrap();
        assert_eq!(selected.column_names(), vec!["v"]);
        assert_eq!(selected.height(), table.height());

        let reordered = DataProcessor::select_columns(&table, &["v", "id"]).unwrap();
        assert_eq!(reordered.column_names(), vec!["v", "id"]);
    }

    #[test]
    fn select_nothing_gives_empty_table() {
        let selected = DataProcessor::select_columns::<&str>(&sample(), &[]).unwrap();
        assert!(selected.is_empty());
        assert_eq!(selected.height(), 0);
    }

    #[test]
    fn select_unknown_column_fails() {
        let err = DataProcessor::select_columns(&sample(), &["nope"]).unwrap_err();
        assert!(matches!(err, SweepError::ColumnNotFound(name) if name == "nope"));
    }
}
