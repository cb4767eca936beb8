//! Data Sweeper - CSV/Excel Cleaning, Preview & Conversion Tool
//!
//! Upload CSV or Excel files, clean them, pick columns, chart the numeric
//! ones and convert between the two formats.

mod gui;

use anyhow::Context;
use data_sweeper::config::{SweeperConfig, CONFIG_FILE_NAME};
use eframe::egui;
use gui::SweeperApp;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = SweeperConfig::load_or_default(Path::new(CONFIG_FILE_NAME))
        .with_context(|| format!("Failed to load {}", CONFIG_FILE_NAME))?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        preview_rows = config.preview_rows,
        default_export = config.default_export.label(),
        "Starting Data Sweeper"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([720.0, 560.0])
            .with_title("Data Sweeper")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Data Sweeper",
        options,
        Box::new(|cc| Ok(Box::new(SweeperApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the window: {}", e))
}
