//! Application Configuration
//! Optional JSON settings file; every field falls back to a default.

use crate::error::{Result, SweepError};
use crate::export::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "data_sweeper.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    /// Maximum numeric columns handed to the chart.
    pub chart_columns: usize,
    /// Export format pre-selected for newly loaded files.
    pub default_export: ExportFormat,
    /// Worksheet name used for XLSX exports.
    pub sheet_name: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            chart_columns: 2,
            default_export: ExportFormat::Csv,
            sheet_name: "Sheet1".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl SweeperConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SweepError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| SweepError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        // Excel rejects empty sheet names and names longer than 31 characters.
        let len = self.sheet_name.chars().count();
        if len == 0 || len > 31 {
            return Err(SweepError::Config(format!(
                "sheet_name must be 1-31 characters, got {:?}",
                self.sheet_name
            )));
        }
        if self
            .sheet_name
            .chars()
            .any(|c| matches!(c, '\\' | '/' | '?' | '*' | '[' | ']' | ':'))
        {
            return Err(SweepError::Config(format!(
                "sheet_name contains a character Excel does not allow: {:?}",
                self.sheet_name
            )));
        }
        Ok(())
    }
}
