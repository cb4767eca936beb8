//! Stats module - Chart summaries and column profiles

mod summary;

pub use summary::{ColumnProfile, NumericSeries, NumericSummary, StatsCalculator};
