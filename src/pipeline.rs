//! Pipeline Module
//! Runs the per-file stages in order: ingest, clean, select columns,
//! summarize, export. Each file is processed on its own; a failure is
//! reported for that file and the batch carries on.

use crate::config::SweeperConfig;
use crate::data::{CleaningOptions, DataLoader, DataProcessor, Table, UploadedFile};
use crate::error::Result;
use crate::export::{ExportFormat, ExportRequest, ExportedFile, Exporter};
use crate::stats::{ColumnProfile, NumericSummary, StatsCalculator};
use tracing::{error, info, warn};

/// Per-file choices made in the front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub cleaning: CleaningOptions,
    /// Columns to keep, in order. `None` keeps every column.
    pub columns: Option<Vec<String>>,
    /// Build the chart summary.
    pub visualize: bool,
    /// Encode the result for download.
    pub export: Option<ExportFormat>,
}

/// Everything the front-end shows for one successfully processed file.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub file_name: String,
    pub size: usize,
    /// Columns after cleaning, before projection; the choices for the picker.
    pub available_columns: Vec<String>,
    /// First rows of the file as loaded.
    pub preview: Table,
    /// The cleaned and projected table.
    pub table: Table,
    pub profile: Vec<ColumnProfile>,
    pub summary: Option<NumericSummary>,
    pub export: Option<ExportedFile>,
}

/// Result of one file in a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub result: Result<ProcessedFile>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs uploads through the processing stages.
pub struct Pipeline {
    config: SweeperConfig,
}

impl Pipeline {
    pub fn new(config: SweeperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Settings for a newly uploaded file: nothing cleaned, every column kept.
    pub fn default_settings(&self) -> FileSettings {
        FileSettings::default()
    }

    /// Process one file with the given settings.
    pub fn run(&self, file: &UploadedFile, settings: &FileSettings) -> Result<ProcessedFile> {
        let loaded = DataLoader::ingest(file)?;
        let preview = loaded.head(self.config.preview_rows);

        let cleaned = DataProcessor::clean(&loaded, settings.cleaning)?;
        let available_columns = cleaned.column_names();

        let table = match &settings.columns {
            Some(columns) => DataProcessor::select_columns(&cleaned, columns)?,
            None => cleaned,
        };

        let profile = StatsCalculator::profile_columns(&table)?;

        let summary = if settings.visualize {
            Some(StatsCalculator::summarize_numeric(
                &table,
                self.config.chart_columns,
            )?)
        } else {
            None
        };

        let export = match settings.export {
            Some(format) => {
                let request = ExportRequest::new(format, file.name());
                Some(Exporter::export(&table, &request, &self.config.sheet_name)?)
            }
            None => None,
        };

        Ok(ProcessedFile {
            file_name: file.name().to_string(),
            size: file.size(),
            available_columns,
            preview,
            table,
            profile,
            summary,
            export,
        })
    }

    /// Process every file in order. Each file gets its own outcome; one bad
    /// file never stops the rest.
    pub fn process_batch<F>(&self, files: &[UploadedFile], mut settings_for: F) -> Vec<FileOutcome>
    where
        F: FnMut(&UploadedFile) -> FileSettings,
    {
        let outcomes: Vec<FileOutcome> = files
            .iter()
            .map(|file| {
                let settings = settings_for(file);
                let result = self.run(file, &settings);
                match &result {
                    Err(e) if e.is_input_error() => {
                        warn!(file = %file.name(), error = %e, "Skipping unreadable file")
                    }
                    Err(e) => error!(file = %file.name(), error = %e, "Processing failed"),
                    Ok(_) => {}
                }
                FileOutcome {
                    file_name: file.name().to_string(),
                    result,
                }
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            processed = outcomes.len() - failed,
            failed,
            "Batch complete"
        );
        outcomes
    }
}
