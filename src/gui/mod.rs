//! GUI module - User interface components

mod app;
mod chart_viewer;
mod file_panel;

pub use app::SweeperApp;
