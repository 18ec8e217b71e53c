use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::SideDiffError;

/// Which document of the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Old,
    New,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Old => "old",
            Side::New => "new",
        }
    }

    pub fn other(&self) -> Side {
        match self {
            Side::Old => Side::New,
            Side::New => Side::Old,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A text file read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub text: String,
}

impl LoadedDocument {
    pub fn new(path: PathBuf, text: String) -> Self {
        Self { path, text }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Outcome of a single-shot file read
#[derive(Debug)]
pub enum LoadEvent {
    Loaded { side: Side, document: LoadedDocument },
    Failed { side: Side, path: PathBuf, error: SideDiffError },
}

impl LoadEvent {
    pub fn side(&self) -> Side {
        match self {
            LoadEvent::Loaded { side, .. } | LoadEvent::Failed { side, .. } => *side,
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    /// A requested read finished
    Load(LoadEvent),
    /// A compared file changed on disk
    FileChanged { side: Side, path: PathBuf },
    Quit,
}
