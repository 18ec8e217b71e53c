use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

use super::events::{AppEvent, LoadEvent, LoadedDocument, Side};
use super::filter::FileFilter;
use crate::error::{Result, SideDiffError};

/// Read a file as UTF-8 text, enforcing the allow-list.
pub fn read_document<P: AsRef<Path>>(path: P, filter: &FileFilter) -> Result<LoadedDocument> {
    let path = path.as_ref();
    filter.check(path)?;
    read_text(path)
}

/// Read a file as UTF-8 text without consulting any allow-list.
pub fn read_text(path: &Path) -> Result<LoadedDocument> {
    let bytes = std::fs::read(path).map_err(|source| SideDiffError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| SideDiffError::InvalidEncoding {
        path: path.to_path_buf(),
    })?;

    Ok(LoadedDocument::new(path.to_path_buf(), text))
}

/// Issues single-shot background reads; each result arrives as an [`AppEvent::Load`].
#[derive(Clone)]
pub struct FileLoader {
    filter: FileFilter,
    event_tx: Sender<AppEvent>,
}

impl FileLoader {
    pub fn new(filter: FileFilter, event_tx: Sender<AppEvent>) -> Self {
        Self { filter, event_tx }
    }

    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    /// Start reading `path` for `side`. Requests cannot be cancelled.
    pub fn request(&self, side: Side, path: PathBuf) {
        self.request_with(side, path, self.filter.clone());
    }

    /// Like [`FileLoader::request`], checked against `filter` instead of the loader's own.
    pub fn request_with(&self, side: Side, path: PathBuf, filter: FileFilter) {
        tracing::debug!("Reading {} file {}", side, path.display());
        self.spawn(side, path, move |path| read_document(path, &filter));
    }

    /// Re-read a file that is already on display. It passed the allow-list
    /// when first opened, so it is not checked again.
    pub fn reload(&self, side: Side, path: PathBuf) {
        tracing::debug!("Re-reading {} file {}", side, path.display());
        self.spawn(side, path, read_text);
    }

    fn spawn<F>(&self, side: Side, path: PathBuf, read: F)
    where
        F: FnOnce(&Path) -> Result<LoadedDocument> + Send + 'static,
    {
        let event_tx = self.event_tx.clone();
        thread::spawn(move || {
            let event = match read(&path) {
                Ok(document) => LoadEvent::Loaded { side, document },
                Err(error) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), error);
                    LoadEvent::Failed { side, path, error }
                }
            };
            // Receiver gone means the app is shutting down
            let _ = event_tx.send(AppEvent::Load(event));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_read_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.txt");
        fs::write(&path, "hello\nworld\n").unwrap();

        let document = read_document(&path, &FileFilter::default()).unwrap();
        assert_eq!(document.text, "hello\nworld\n");
        assert_eq!(document.file_name(), "doc.txt");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = read_document(&path, &FileFilter::default()).unwrap_err();
        assert!(matches!(err, SideDiffError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_document(temp_dir.path().join("nope.txt"), &FileFilter::default()).unwrap_err();
        assert!(matches!(err, SideDiffError::FileRead { .. }));
    }

    #[test]
    fn test_loader_delivers_events() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("old.txt");
        fs::write(&path, "content").unwrap();

        let (tx, rx) = mpsc::channel();
        let loader = FileLoader::new(FileFilter::default(), tx);

        loader.request(Side::Old, path.clone());
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Load(LoadEvent::Loaded { side, document }) => {
                assert_eq!(side, Side::Old);
                assert_eq!(document.text, "content");
            }
            other => panic!("Expected Loaded event, got {:?}", other),
        }

        loader.request(Side::New, temp_dir.path().join("missing.txt"));
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Load(LoadEvent::Failed { side, .. }) => assert_eq!(side, Side::New),
            other => panic!("Expected Failed event, got {:?}", other),
        }
    }

    #[test]
    fn test_request_with_uses_the_given_filter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("server.log");
        fs::write(&path, "started").unwrap();

        let (tx, rx) = mpsc::channel();
        let loader = FileLoader::new(FileFilter::default(), tx);

        loader.request(Side::Old, path.clone());
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Load(LoadEvent::Failed { error, .. }) => {
                assert!(matches!(error, SideDiffError::UnsupportedFile { .. }));
            }
            other => panic!("Expected Failed event, got {:?}", other),
        }

        let mut all_files = FileFilter::default();
        all_files.toggle_allow_all();
        loader.request_with(Side::Old, path, all_files);
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Load(LoadEvent::Loaded { document, .. }) => assert_eq!(document.text, "started"),
            other => panic!("Expected Loaded event, got {:?}", other),
        }
    }

    #[test]
    fn test_reload_skips_the_allow_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("server.log");
        fs::write(&path, "rotated").unwrap();

        let (tx, rx) = mpsc::channel();
        let loader = FileLoader::new(FileFilter::default(), tx);

        loader.reload(Side::New, path);
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Load(LoadEvent::Loaded { side, document }) => {
                assert_eq!(side, Side::New);
                assert_eq!(document.text, "rotated");
            }
            other => panic!("Expected Loaded event, got {:?}", other),
        }
    }
}
