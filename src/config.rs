//! Configuration management for SideDiff
//!
//! This module provides configuration structures and defaults for the diff
//! engine, the terminal UI, file selection, export and caching. Values come
//! from an optional TOML file, then `SIDEDIFF_*` environment variables, then
//! command line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::diff::DiffAlgorithmType;
use crate::error::{Result, SideDiffError};
use crate::export::ExportFormat;

/// Extensions offered by the file picker unless configured otherwise
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "txt", "md", "js", "ts", "jsx", "tsx", "json", "xml", "html", "css",
];

/// Global configuration for SideDiff
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideDiffConfig {
    /// Diff engine configuration
    pub diff: DiffSettings,
    /// UI configuration
    pub ui: UiConfig,
    /// File selection configuration
    pub files: FilesConfig,
    /// Export configuration
    pub export: ExportConfig,
    /// Caching configuration
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    /// Line-diff algorithm used for every comparison
    pub algorithm: DiffAlgorithmType,
}

/// Configuration for the terminal user interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long a navigated-to line stays highlighted, in milliseconds
    pub highlight_duration_ms: u64,
    /// Lines moved by PgUp/PgDn
    pub scroll_step: usize,
    /// Show line numbers in the panes
    pub show_line_numbers: bool,
    /// Colorize pane content with syntect
    pub syntax_highlighting: bool,
    /// Scroll both panes together
    pub sync_scroll: bool,
}

/// Configuration for file selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Extensions the picker and loader accept (case-insensitive, no dot)
    pub allowed_extensions: Vec<String>,
}

/// Configuration for change list export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the fixed-name export file is written to
    pub directory: PathBuf,
    /// Format used by the default export action
    pub format: ExportFormat,
}

/// Configuration for caches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of syntax-highlighted lines kept
    pub highlight_cache_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            highlight_duration_ms: 1500,
            scroll_step: 10,
            show_line_numbers: true,
            syntax_highlighting: true,
            sync_scroll: true,
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: ExportFormat::Xlsx,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            highlight_cache_size: 2000,
        }
    }
}

impl UiConfig {
    /// Get navigation highlight duration
    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_duration_ms)
    }
}

/// Configuration loading and management
impl SideDiffConfig {
    /// Default config file location: `<config dir>/sidediff/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sidediff").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| SideDiffError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|err| SideDiffError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate().map_err(|message| SideDiffError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    /// Load from the default location if the file exists, otherwise use defaults
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply overrides from environment variables
    pub fn apply_env(mut self) -> Self {
        if let Ok(val) = std::env::var("SIDEDIFF_ALGORITHM") {
            match val.to_lowercase().as_str() {
                "myers" => self.diff.algorithm = DiffAlgorithmType::Myers,
                "patience" => self.diff.algorithm = DiffAlgorithmType::Patience,
                "lcs" => self.diff.algorithm = DiffAlgorithmType::Lcs,
                other => tracing::warn!("Ignoring unknown SIDEDIFF_ALGORITHM value: {}", other),
            }
        }

        if let Ok(val) = std::env::var("SIDEDIFF_HIGHLIGHT_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.ui.highlight_duration_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("SIDEDIFF_EXPORT_DIR") {
            self.export.directory = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("SIDEDIFF_EXTENSIONS") {
            let extensions: Vec<String> = val
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect();
            if !extensions.is_empty() {
                self.files.allowed_extensions = extensions;
            }
        }

        self
    }

    /// Defaults with environment overrides
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.ui.scroll_step == 0 {
            return Err("scroll_step must be greater than 0".to_string());
        }

        if self.cache.highlight_cache_size == 0 {
            return Err("highlight_cache_size must be greater than 0".to_string());
        }

        if self.files.allowed_extensions.is_empty() {
            return Err("allowed_extensions must not be empty".to_string());
        }

        Ok(())
    }
}
