//! File Panel Widget
//! One card per uploaded file with preview, cleaning, column and export controls.

use super::chart_viewer::ChartViewer;
use data_sweeper::data::{CleaningOptions, Table, UploadedFile};
use data_sweeper::export::{ExportFormat, ExportRequest, ExportedFile, Exporter};
use data_sweeper::pipeline::{FileOutcome, FileSettings, Pipeline, ProcessedFile};
use data_sweeper::stats::ColumnProfile;
use data_sweeper::Result;
use egui::{Color32, RichText, ScrollArea};
use tracing::{info, warn};

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(40, 167, 69);
const WARNING_COLOR: Color32 = Color32::from_rgb(243, 156, 18);

/// Actions triggered inside a file panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePanelAction {
    None,
    SettingsChanged,
    Convert,
    Remove,
}

/// Per-file controls and the latest processing result.
pub struct FilePanel {
    file: UploadedFile,
    settings: FileSettings,
    /// "Clean data" checkbox; the cleaning toggles only apply while it is on.
    clean_enabled: bool,
    export_format: ExportFormat,
    outcome: Result<ProcessedFile>,
    message: Option<(Color32, String)>,
}

impl FilePanel {
    pub fn from_outcome(file: UploadedFile, outcome: FileOutcome, export_format: ExportFormat) -> Self {
        Self {
            file,
            settings: FileSettings::default(),
            clean_enabled: false,
            export_format,
            outcome: outcome.result,
            message: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Settings handed to the pipeline for the current control state.
    fn effective_settings(&self) -> FileSettings {
        let mut settings = self.settings.clone();
        if !self.clean_enabled {
            settings.cleaning = CleaningOptions::default();
        }
        settings
    }

    /// Re-run the pipeline for this file only.
    pub fn refresh(&mut self, pipeline: &Pipeline) {
        self.outcome = pipeline.run(&self.file, &self.effective_settings());
        self.message = None;
    }

    /// Export the processed table and ask where to save it.
    pub fn convert(&mut self, pipeline: &Pipeline) {
        let Ok(processed) = &self.outcome else {
            return;
        };
        let request = ExportRequest::new(self.export_format, self.file.name());
        match Exporter::export(&processed.table, &request, &pipeline.config().sheet_name) {
            Ok(export) => self.save_download(export),
            Err(e) => {
                warn!(file = %self.file.name(), error = %e, "Conversion failed");
                self.message = Some((ERROR_COLOR, format!("❌ {}", e)));
            }
        }
    }

    fn save_download(&mut self, export: ExportedFile) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter(self.export_format.label(), &[self.export_format.extension()])
            .set_file_name(&export.file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        match std::fs::write(&path, &export.bytes) {
            Ok(()) => {
                info!(
                    file = %export.file_name,
                    mime = export.mime,
                    bytes = export.bytes.len(),
                    path = %path.display(),
                    "Saved converted file"
                );
                self.message = Some((
                    SUCCESS_COLOR,
                    format!("📥 Saved {} as {}", export.file_name, self.export_format.label()),
                ));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not write converted file");
                self.message = Some((ERROR_COLOR, format!("❌ Could not save: {}", e)));
            }
        }
    }

    /// Draw the panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> FilePanelAction {
        let mut action = FilePanelAction::None;
        let border = if self.outcome.is_ok() {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        } else {
            ERROR_COLOR
        };

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, border))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());

                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("📄 {}", self.file.name())).size(16.0).strong());
                    ui.label(
                        RichText::new(format!("{:.2} KB", self.file.size_kb()))
                            .color(Color32::GRAY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✖ Remove").clicked() {
                            action = FilePanelAction::Remove;
                        }
                    });
                });

                let processed = match &self.outcome {
                    Ok(processed) => processed.clone(),
                    Err(e) => {
                        ui.add_space(5.0);
                        ui.colored_label(ERROR_COLOR, format!("❌ {}", e));
                        return;
                    }
                };

                ui.add_space(8.0);
                if let Some(changed) = self.show_body(ui, &processed) {
                    action = changed;
                }
            });

        action
    }

    fn show_body(&mut self, ui: &mut egui::Ui, processed: &ProcessedFile) -> Option<FilePanelAction> {
        let mut action = None;

        // ===== Preview =====
        egui::CollapsingHeader::new(RichText::new("👀 Preview of the Data").strong())
            .id_salt("preview")
            .default_open(true)
            .show(ui, |ui| {
                Self::draw_table(ui, "preview_grid", &processed.preview);
            });

        egui::CollapsingHeader::new(RichText::new("📋 Column Profile").strong())
            .id_salt("profile")
            .default_open(false)
            .show(ui, |ui| {
                Self::draw_profile(ui, &processed.profile);
            });

        ui.add_space(8.0);
        ui.separator();

        // ===== Cleaning =====
        ui.label(RichText::new("🧼 Data Cleaning Options").size(14.0).strong());
        if ui
            .checkbox(&mut self.clean_enabled, format!("Clean Data for {}", self.file.name()))
            .changed()
        {
            action = Some(FilePanelAction::SettingsChanged);
        }
        if self.clean_enabled {
            ui.horizontal(|ui| {
                if ui
                    .checkbox(&mut self.settings.cleaning.deduplicate, "Remove Duplicates")
                    .changed()
                {
                    action = Some(FilePanelAction::SettingsChanged);
                }
                if ui
                    .checkbox(&mut self.settings.cleaning.impute_missing, "Fill Missing Values")
                    .changed()
                {
                    action = Some(FilePanelAction::SettingsChanged);
                }
            });
            if self.settings.cleaning.deduplicate {
                ui.colored_label(SUCCESS_COLOR, "✅ Duplicates removed!");
            }
            if self.settings.cleaning.impute_missing {
                ui.colored_label(SUCCESS_COLOR, "✅ Missing values filled with column means.");
            }
        }

        ui.add_space(8.0);
        ui.separator();

        // ===== Column selection =====
        ui.label(RichText::new("📊 Select Columns to Keep").size(14.0).strong());
        if self.show_column_picker(ui, &processed.available_columns) {
            action = Some(FilePanelAction::SettingsChanged);
        }

        ui.add_space(8.0);
        ui.separator();

        // ===== Visualization =====
        ui.label(RichText::new("📈 Data Visualization").size(14.0).strong());
        if ui
            .checkbox(
                &mut self.settings.visualize,
                format!("Show Visualization for {}", self.file.name()),
            )
            .changed()
        {
            action = Some(FilePanelAction::SettingsChanged);
        }
        if let Some(summary) = &processed.summary {
            ChartViewer::show(ui, summary);
        }

        ui.add_space(8.0);
        ui.separator();

        // ===== Conversion =====
        ui.label(RichText::new("🔄 Conversion Option").size(14.0).strong());
        ui.horizontal(|ui| {
            ui.label(format!("Convert {} to:", self.file.name()));
            for format in ExportFormat::ALL {
                ui.radio_value(&mut self.export_format, format, format.label());
            }
        });
        ui.add_space(4.0);
        let button = egui::Button::new(RichText::new(format!("Convert {}", self.file.name())))
            .min_size(egui::vec2(150.0, 28.0));
        if ui.add(button).clicked() {
            action = Some(FilePanelAction::Convert);
        }

        if let Some((color, message)) = &self.message {
            ui.add_space(4.0);
            ui.colored_label(*color, message.as_str());
        }

        action
    }

    /// Checkbox list over the available columns. Returns true on change.
    fn show_column_picker(&mut self, ui: &mut egui::Ui, available: &[String]) -> bool {
        let selected: Vec<String> = self
            .settings
            .columns
            .clone()
            .unwrap_or_else(|| available.to_vec());
        let mut flags: Vec<bool> = available.iter().map(|c| selected.contains(c)).collect();
        let mut changed = false;

        egui::Frame::none()
            .fill(ui.visuals().extreme_bg_color)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("column_picker")
                    .max_height(120.0)
                    .show(ui, |ui| {
                        ui.horizontal_wrapped(|ui| {
                            for (flag, column) in flags.iter_mut().zip(available) {
                                changed |= ui.checkbox(flag, column.as_str()).changed();
                            }
                        });
                    });
            });

        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                flags.iter_mut().for_each(|f| *f = true);
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                flags.iter_mut().for_each(|f| *f = false);
                changed = true;
            }
        });

        if flags.iter().all(|f| !f) && !available.is_empty() {
            ui.colored_label(WARNING_COLOR, "⚠️ No columns selected; the export will be empty.");
        }

        if changed {
            let columns: Vec<String> = available
                .iter()
                .zip(&flags)
                .filter(|(_, keep)| **keep)
                .map(|(c, _)| c.clone())
                .collect();
            self.settings.columns = if columns.len() == available.len() {
                None
            } else {
                Some(columns)
            };
        }
        changed
    }

    fn draw_table(ui: &mut egui::Ui, id: &str, table: &Table) {
        if table.is_empty() {
            ui.label(RichText::new("No columns").color(Color32::GRAY));
            return;
        }
        let rows = match table.rows() {
            Ok(rows) => rows,
            Err(e) => {
                ui.colored_label(ERROR_COLOR, e.to_string());
                return;
            }
        };

        ScrollArea::horizontal().id_salt(id).show(ui, |ui| {
            egui::Grid::new(id).striped(true).show(ui, |ui| {
                for name in table.column_names() {
                    ui.label(RichText::new(name).strong());
                }
                ui.end_row();

                for row in &rows {
                    for cell in row {
                        if cell.is_missing() {
                            ui.label(RichText::new("—").color(Color32::GRAY));
                        } else {
                            ui.label(cell.to_string());
                        }
                    }
                    ui.end_row();
                }
            });
        });
    }

    fn draw_profile(ui: &mut egui::Ui, profile: &[ColumnProfile]) {
        let fmt = |v: Option<f64>| v.map(|v| format!("{:.3}", v)).unwrap_or_default();

        ScrollArea::horizontal().id_salt("profile_scroll").show(ui, |ui| {
            egui::Grid::new("profile_grid").striped(true).show(ui, |ui| {
                for header in ["Column", "Type", "Present", "Missing", "Mean", "Min", "Max", "Std"] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();

                for column in profile {
                    ui.label(column.name.as_str());
                    ui.label(column.kind.label());
                    ui.label(column.present.to_string());
                    ui.label(column.missing.to_string());
                    ui.label(fmt(column.mean));
                    ui.label(fmt(column.min));
                    ui.label(fmt(column.max));
                    ui.label(fmt(column.std));
                    ui.end_row();
                }
            });
        });
    }
}
