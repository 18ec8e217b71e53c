//! Core functionality module
//!
//! Contains file loading, watching, filtering and the comparison session

pub mod events;
pub mod filter;
pub mod loader;
pub mod session;
pub mod watcher;

// Re-export main types
pub use events::{AppEvent, LoadEvent, LoadedDocument, Side};
pub use filter::FileFilter;
pub use loader::{read_document, read_text, FileLoader};
pub use session::ComparisonSession;
pub use watcher::ComparisonWatcher;
