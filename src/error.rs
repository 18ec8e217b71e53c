//! Error types for SideDiff.
//!
//! File access and export failures are reported to the caller as-is; nothing
//! here is retried.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SideDiffError {
    /// The file could not be read (missing, permission denied, ...).
    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text.
    #[error("{} is not valid UTF-8 text", path.display())]
    InvalidEncoding { path: PathBuf },

    /// The file's extension is not on the allow-list.
    #[error("{} is not an allowed text file type", path.display())]
    UnsupportedFile { path: PathBuf },

    /// Export was requested for a comparison without changes.
    #[error("Nothing to export: the comparison has no changes")]
    NothingToExport,

    #[error("Spreadsheet write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration file is unreadable or invalid.
    #[error("Invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Result type alias for SideDiff operations.
pub type Result<T> = std::result::Result<T, SideDiffError>;
