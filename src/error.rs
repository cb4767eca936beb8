//! Error types shared by the loading, cleaning and export stages.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced while processing a single uploaded file.
///
/// None of these are fatal for a batch: the pipeline reports them per file
/// and moves on to the next upload.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Malformed {format} input: {reason}")]
    MalformedInput { format: &'static str, reason: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SweepError {
    pub(crate) fn malformed(format: &'static str, reason: impl ToString) -> Self {
        SweepError::MalformedInput {
            format,
            reason: reason.to_string(),
        }
    }

    /// True for errors caused by the uploaded bytes rather than by the tool.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SweepError::UnsupportedFormat { .. } | SweepError::MalformedInput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
