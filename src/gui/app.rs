//! Data Sweeper Main Application
//! File picker on top, one card per uploaded file, batch status at the bottom.

use super::file_panel::{FilePanel, FilePanelAction};
use data_sweeper::config::SweeperConfig;
use data_sweeper::data::UploadedFile;
use data_sweeper::pipeline::Pipeline;
use egui::{Color32, RichText, ScrollArea};
use tracing::{info, warn};

/// Main application window.
pub struct SweeperApp {
    pipeline: Pipeline,
    panels: Vec<FilePanel>,
    status: String,
}

impl SweeperApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: SweeperConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            panels: Vec::new(),
            status: "Upload CSV or Excel files to get started".to_string(),
        }
    }

    /// Handle the Browse button
    fn handle_browse(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("CSV or Excel", &["csv", "xlsx"])
            .pick_files()
        else {
            return; // User cancelled
        };

        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            match UploadedFile::from_path(path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not read file");
                    self.status = format!("Could not read {}: {}", path.display(), e);
                }
            }
        }
        self.add_files(files);
    }

    /// Files dropped onto the window. Any extension is accepted here so an
    /// unsupported one shows up as an error card.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let files: Vec<UploadedFile> = dropped
            .into_iter()
            .filter_map(|d| match (d.path, d.bytes) {
                (_, Some(bytes)) => Some(UploadedFile::new(d.name, bytes.to_vec())),
                (Some(path), None) => UploadedFile::from_path(&path)
                    .map_err(|e| warn!(path = %path.display(), error = %e, "Could not read file"))
                    .ok(),
                (None, None) => None,
            })
            .collect();
        self.add_files(files);
    }

    fn add_files(&mut self, files: Vec<UploadedFile>) {
        if files.is_empty() {
            return;
        }

        let outcomes = self
            .pipeline
            .process_batch(&files, |_| self.pipeline.default_settings());
        let default_export = self.pipeline.config().default_export;

        for (file, outcome) in files.into_iter().zip(outcomes) {
            info!(file = %file.name(), ok = outcome.is_ok(), "Added file");
            self.panels
                .push(FilePanel::from_outcome(file, outcome, default_export));
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        let failed = self.panels.iter().filter(|p| !p.is_ok()).count();
        self.status = if self.panels.is_empty() {
            "Upload CSV or Excel files to get started".to_string()
        } else if failed == 0 {
            format!("✅ {} file(s) processed", self.panels.len())
        } else {
            format!(
                "{} file(s) processed, {} could not be read",
                self.panels.len() - failed,
                failed
            )
        };
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("💿 Data Sweeper").size(22.0).strong());
            ui.add_space(10.0);
            ui.label(
                RichText::new("Transform files between CSV and Excel with cleaning and visualization")
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui
                .add(egui::Button::new("📂 Browse...").min_size(egui::vec2(110.0, 28.0)))
                .clicked()
            {
                self.handle_browse();
            }
            ui.label(RichText::new("or drop files onto the window").color(Color32::GRAY));
            if !self.panels.is_empty() && ui.button("Clear All").clicked() {
                self.panels.clear();
                self.update_status();
            }
        });
        ui.add_space(6.0);
    }
}

impl eframe::App for SweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.show_header(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.add_space(2.0);
            ui.label(self.status.as_str());
            ui.add_space(2.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.panels.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No files uploaded").size(20.0));
                });
                return;
            }

            let mut removed = None;
            let mut changed = false;
            ScrollArea::vertical().show(ui, |ui| {
                for (idx, panel) in self.panels.iter_mut().enumerate() {
                    ui.push_id(idx, |ui| match panel.show(ui) {
                        FilePanelAction::SettingsChanged => {
                            panel.refresh(&self.pipeline);
                            changed = true;
                        }
                        FilePanelAction::Convert => panel.convert(&self.pipeline),
                        FilePanelAction::Remove => removed = Some(idx),
                        FilePanelAction::None => {}
                    });
                    ui.add_space(12.0);
                }
            });

            if let Some(idx) = removed {
                self.panels.remove(idx);
                changed = true;
            }
            if changed {
                self.update_status();
            }
        });

        if ctx.input(|i| !i.raw.hovered_files.is_empty()) {
            egui::Area::new(egui::Id::new("drop_hint"))
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(RichText::new("Drop files to upload").size(24.0).strong());
                });
        }
    }
}

