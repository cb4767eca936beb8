//! Data module - Upload loading, typed tables and cleaning

mod loader;
mod processor;
mod table;

pub use loader::{DataLoader, SourceFormat, UploadedFile};
pub use processor::{CleaningOptions, DataProcessor};
pub use table::{is_missing_marker, parse_number, Cell, ColumnKind, RawColumn, Table, MISSING_MARKERS};
