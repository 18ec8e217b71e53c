//! User interface module
//!
//! Contains the TUI, its document panes and the file picker

pub mod panes;
pub mod picker;
pub mod tui;

// Re-export main types
pub use picker::{FilePicker, PickerEntry, PickerOutcome};
pub use tui::{restore_terminal, setup_terminal, Focus, StatusLevel, StatusMessage, TuiApp};
