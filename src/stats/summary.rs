//! Numeric Summary Module
//! Picks the numeric columns for the chart and computes per-column profiles.

use crate::data::{ColumnKind, Table};
use crate::error::Result;
use statrs::statistics::Statistics;

/// Values of one numeric column, missing cells kept as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Chart input: the leading numeric columns, or a reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericSummary {
    Columns(Vec<NumericSeries>),
    NoNumericColumns,
}

impl NumericSummary {
    pub fn column_names(&self) -> Vec<&str> {
        match self {
            NumericSummary::Columns(series) => series.iter().map(|s| s.name.as_str()).collect(),
            NumericSummary::NoNumericColumns => Vec::new(),
        }
    }
}

/// Descriptive statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub present: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Sample standard deviation; needs at least two values.
    pub std: Option<f64>,
}

/// Statistics over tables.
pub struct StatsCalculator;

impl StatsCalculator {
    /// The first `limit` numeric columns in table order.
    pub fn summarize_numeric(table: &Table, limit: usize) -> Result<NumericSummary> {
        let names = table.numeric_column_names();
        if names.is_empty() {
            return Ok(NumericSummary::NoNumericColumns);
        }

        let series = names
            .into_iter()
            .take(limit)
            .map(|name| {
                let values = table.numeric_values(&name)?;
                Ok(NumericSeries { name, values })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NumericSummary::Columns(series))
    }

    /// Profile every column in table order.
    pub fn profile_columns(table: &Table) -> Result<Vec<ColumnProfile>> {
        table
            .column_names()
            .into_iter()
            .map(|name| Self::profile_column(table, name))
            .collect()
    }

    fn profile_column(table: &Table, name: String) -> Result<ColumnProfile> {
        let kind = table.kind(&name).unwrap_or(ColumnKind::Text);

        if kind == ColumnKind::Text {
            let cells = table.column_cells(&name)?;
            let missing = cells.iter().filter(|c| c.is_missing()).count();
            return Ok(ColumnProfile {
                name,
                kind,
                present: cells.len() - missing,
                missing,
                mean: None,
                min: None,
                max: None,
                std: None,
            });
        }

        let values = table.numeric_values(&name)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let missing = values.len() - present.len();
        let has_values = !present.is_empty();

        Ok(ColumnProfile {
            name,
            kind,
            present: present.len(),
            missing,
            mean: has_values.then(|| present.iter().mean()),
            min: has_values.then(|| Statistics::min(present.iter())),
            max: has_values.then(|| Statistics::max(present.iter())),
            std: (present.len() > 1).then(|| present.iter().std_dev()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn mixed_table() -> Table {
        Table::from_cells(vec![
            ("id", vec![Cell::from("a"), Cell::from("b"), Cell::from("c")]),
            (
                "score",
                vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Missing],
            ),
            (
                "age",
                vec![Cell::Number(30.0), Cell::Number(40.0), Cell::Number(50.0)],
            ),
            ("note", vec![Cell::from("x"), Cell::Missing, Cell::from("z")]),
            (
                "extra",
                vec![Cell::Number(7.0), Cell::Number(8.0), Cell::Number(9.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn summary_takes_first_two_numeric_columns() {
        let summary = StatsCalculator::summarize_numeric(&mixed_table(), 2).unwrap();
        assert_eq!(summary.column_names(), vec!["score", "age"]);

        let NumericSummary::Columns(series) = summary else {
            panic!("expected numeric columns");
        };
        assert_eq!(series[0].values, vec![Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn summary_on_text_only_table() {
        let table = Table::from_cells(vec![
            ("a", vec![Cell::from("x")]),
            ("b", vec![Cell::from("y")]),
        ])
        .unwrap();
        assert_eq!(
            StatsCalculator::summarize_numeric(&table, 2).unwrap(),
            NumericSummary::NoNumericColumns
        );
    }

    #[test]
    fn summary_on_empty_table() {
        assert_eq!(
            StatsCalculator::summarize_numeric(&Table::empty(), 2).unwrap(),
            NumericSummary::NoNumericColumns
        );
    }

    #[test]
    fn profiles_numeric_and_text_columns() {
        let profiles = StatsCalculator::profile_columns(&mixed_table()).unwrap();
        assert_eq!(profiles.len(), 5);

        let note = &profiles[3];
        assert_eq!(note.kind, ColumnKind::Text);
        assert_eq!((note.present, note.missing), (2, 1));
        assert_eq!(note.mean, None);

        let age = &profiles[2];
        assert_eq!(age.kind, ColumnKind::Numeric);
        assert_eq!(age.mean, Some(40.0));
        assert_eq!(age.min, Some(30.0));
        assert_eq!(age.max, Some(50.0));
        assert!((age.std.unwrap() - 10.0).abs() < 1e-9);

        let score = &profiles[1];
        assert_eq!((score.present, score.missing), (2, 1));
    }

    #[test]
    fn profile_of_all_missing_numeric_column() {
        let table = Table::from_cells(vec![("v", vec![Cell::Missing, Cell::Missing])]).unwrap();
        let profile = &StatsCalculator::profile_columns(&table).unwrap()[0];
        assert_eq!(profile.present, 0);
        assert_eq!(profile.mean, None);
        assert_eq!(profile.std, None);
    }
}
