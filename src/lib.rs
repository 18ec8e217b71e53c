pub mod cli;
pub mod config;
pub mod core;
pub mod diff;
pub mod error;
pub mod export;
pub mod highlight;
pub mod ui;

pub use config::SideDiffConfig;
pub use crate::core::{AppEvent, ComparisonSession, FileFilter, FileLoader, LoadEvent, LoadedDocument, Side};
pub use diff::{classify, ChangeKind, ChangeSummary, Comparison, DiffAlgorithmType, LineKind};
pub use error::{Result, SideDiffError};
pub use export::{ChangeExporter, ExportFormat};
