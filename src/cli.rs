use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use clap::{Parser, ValueEnum};

use crate::config::SideDiffConfig;
use crate::core::FileFilter;
use crate::diff::DiffAlgorithmType;
use crate::export::ExportFormat;

#[derive(Parser)]
#[command(name = "sidediff")]
#[command(author = "SideDiff Team")]
#[command(version = "0.1.0")]
#[command(about = "Side-by-side text comparison with a navigable change list")]
#[command(long_about = "SideDiff compares two text files line by line, pairs replaced lines as modifications, shows both documents side by side in a terminal UI with a clickable change list, and exports the changes to a spreadsheet.")]
pub struct Cli {
    /// Original (left) file
    #[arg(value_name = "OLD", help = "Original file (picked interactively in TUI mode if omitted)")]
    pub old: Option<PathBuf>,

    /// Changed (right) file
    #[arg(value_name = "NEW", help = "Changed file (picked interactively in TUI mode if omitted)")]
    pub new: Option<PathBuf>,

    /// Line diff algorithm
    #[arg(short, long, help = "Diff algorithm (defaults to the configured one)")]
    pub algorithm: Option<DiffAlgorithmType>,

    /// Output format
    #[arg(long, default_value = "tui", help = "Output format")]
    pub output: OutputFormat,

    /// Export the change list and exit
    #[arg(short, long, help = "Write the change list to diff_changes.<format> and exit")]
    pub export: Option<ExportFormat>,

    /// Directory for exported files
    #[arg(long, value_name = "DIR", help = "Directory to write exports to")]
    pub export_dir: Option<PathBuf>,

    /// Re-compare when either file changes on disk
    #[arg(short, long, help = "Reload files when they change on disk")]
    pub watch: bool,

    /// Accept files outside the extension allow-list
    #[arg(long, help = "Allow any file type, not only known text extensions")]
    pub all_files: bool,

    /// Configuration file
    #[arg(long, value_name = "FILE", help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Width for side-by-side text output
    #[arg(long, default_value = "120", help = "Column width for text output")]
    pub width: usize,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Terminal user interface (default)
    Tui,
    /// Side-by-side plain text
    Text,
    /// Change list, one block per change
    Changes,
    /// Compact single-line format
    Compact,
    /// JSON output for scripting
    Json,
}

impl Cli {
    /// Load the configuration file (explicit or default location), then apply
    /// environment and command line overrides.
    pub fn load_config(&self) -> crate::error::Result<SideDiffConfig> {
        let config = match &self.config {
            Some(path) => SideDiffConfig::load(path)?,
            None => SideDiffConfig::load_or_default()?,
        };
        let mut config = config.apply_env();

        if let Some(algorithm) = self.algorithm {
            config.diff.algorithm = algorithm;
        }
        if let Some(dir) = &self.export_dir {
            config.export.directory = dir.clone();
        }
        if let Some(format) = self.export {
            config.export.format = format;
        }
        if self.no_color {
            config.ui.syntax_highlighting = false;
        }

        Ok(config)
    }

    pub fn file_filter(&self, config: &SideDiffConfig) -> FileFilter {
        FileFilter::from_config(&config.files).allow_all(self.all_files)
    }

    /// Both paths, when given
    pub fn paths(&self) -> Option<(PathBuf, PathBuf)> {
        match (&self.old, &self.new) {
            (Some(old), Some(new)) => Some((old.clone(), new.clone())),
            _ => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.output == OutputFormat::Tui && self.export.is_none()
    }

    /// Initialise tracing. The TUI owns the terminal, so in interactive mode
    /// logs go to a file in the temp directory instead of stderr.
    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        let builder = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false);

        if self.is_interactive() {
            let path = std::env::temp_dir().join("sidediff.log");
            match File::create(&path) {
                Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
                Err(err) => {
                    eprintln!("Failed to create log file {}: {}", path.display(), err);
                }
            }
        } else {
            builder.with_writer(std::io::stderr).init();
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for path in [&self.old, &self.new].into_iter().flatten() {
            if !path.exists() {
                return Err(format!("Path does not exist: {}", path.display()));
            }
            if !path.is_file() {
                return Err(format!("Path is not a file: {}", path.display()));
            }
        }

        if !self.is_interactive() && self.paths().is_none() {
            return Err("Both OLD and NEW files are required outside the TUI".to_string());
        }

        if self.width < 20 {
            return Err("Width must be at least 20".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::parse_from([
            "sidediff",
            "old.txt",
            "new.txt",
            "--algorithm",
            "patience",
            "--output",
            "json",
            "--export",
            "csv",
        ]);

        assert_eq!(cli.old, Some(PathBuf::from("old.txt")));
        assert_eq!(cli.algorithm, Some(DiffAlgorithmType::Patience));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.export, Some(ExportFormat::Csv));
        assert!(!cli.is_interactive());
    }

    #[test]
    fn test_non_interactive_needs_both_paths() {
        let cli = Cli::parse_from(["sidediff", "--output", "compact"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["sidediff"]);
        assert!(cli.is_interactive());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_missing_file_fails_validation() {
        let cli = Cli::parse_from(["sidediff", "/definitely/not/here.txt"]);
        let err = cli.validate().unwrap_err();
        assert!(err.contains("does not exist"));
    }
}
