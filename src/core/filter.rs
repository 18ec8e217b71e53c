use std::path::{Path, PathBuf};

use crate::config::FilesConfig;
use crate::error::{Result, SideDiffError};

/// Extension allow-list for files that can be compared
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
    allow_all: bool,
}

impl FileFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            allow_all: false,
        }
    }

    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(&config.allowed_extensions)
    }

    /// Accept every file regardless of extension ("All files")
    pub fn allow_all(mut self, allow_all: bool) -> Self {
        self.allow_all = allow_all;
        self
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    pub fn toggle_allow_all(&mut self) {
        self.allow_all = !self.allow_all;
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_allowed<P: AsRef<Path>>(&self, path: P) -> bool {
        if self.allow_all {
            return true;
        }

        path.as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Reject paths outside the allow-list
    pub fn check<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if self.is_allowed(path) {
            Ok(())
        } else {
            Err(SideDiffError::UnsupportedFile {
                path: path.to_path_buf(),
            })
        }
    }

    /// Directories and allowed files directly inside `dir`, directories first,
    /// each group sorted by name. Hidden entries are skipped.
    pub fn list_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| SideDiffError::FileRead {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Error reading directory entry: {}", err);
                    continue;
                }
            };
            let path = entry.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false);
            if hidden {
                continue;
            }

            if path.is_dir() {
                dirs.push(path);
            } else if self.is_allowed(&path) {
                files.push(path);
            }
        }

        dirs.sort();
        files.sort();
        dirs.extend(files);
        Ok(dirs)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::from_config(&FilesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_allow_list() {
        let filter = FileFilter::default();

        assert!(filter.is_allowed("notes.txt"));
        assert!(filter.is_allowed("README.MD"));
        assert!(filter.is_allowed("src/app.tsx"));
        assert!(!filter.is_allowed("image.png"));
        assert!(!filter.is_allowed("Makefile"));
    }

    #[test]
    fn test_allow_all_accepts_anything() {
        let filter = FileFilter::default().allow_all(true);
        assert!(filter.is_allowed("image.png"));
        assert!(filter.check("Makefile").is_ok());
    }

    #[test]
    fn test_check_reports_unsupported_file() {
        let filter = FileFilter::new(["rs"]);
        let err = filter.check("data.bin").unwrap_err();
        assert!(matches!(err, SideDiffError::UnsupportedFile { .. }));
    }

    #[test]
    fn test_list_dir_orders_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.md"), "a").unwrap();
        fs::write(root.join("skip.png"), "x").unwrap();
        fs::write(root.join(".hidden.txt"), "h").unwrap();

        let entries = FileFilter::default().list_dir(root).unwrap();
        let names: Vec<String> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["sub", "a.md", "b.txt"]);
    }
}
