//! Data Sweeper - CSV/Excel cleaning, preview and conversion
//!
//! Library side of the application: loading uploads, cleaning tables,
//! numeric summaries and CSV/XLSX export. The egui front-end lives in the
//! binary and drives everything through [`pipeline::Pipeline`].

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod stats;

pub use error::{Result, SweepError};
pub use pipeline::{FileOutcome, FileSettings, Pipeline, ProcessedFile};
