//! Directory-browsing file picker restricted to the text extension allow-list

use std::path::{Path, PathBuf};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::core::{FileFilter, Side};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEntry {
    Parent,
    Dir(PathBuf),
    File(PathBuf),
}

/// Result of feeding a key to the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Pending,
    Selected(PathBuf),
    Cancelled,
}

pub struct FilePicker {
    side: Side,
    dir: PathBuf,
    entries: Vec<PickerEntry>,
    state: ListState,
    filter: FileFilter,
    error: Option<String>,
}

impl FilePicker {
    pub fn new<P: AsRef<Path>>(side: Side, start_dir: P, filter: FileFilter) -> Self {
        // Absolute, so that walking up never dead-ends at a relative root
        let start_dir = start_dir.as_ref();
        let dir = start_dir
            .canonicalize()
            .or_else(|_| std::env::current_dir().map(|cwd| cwd.join(start_dir)))
            .unwrap_or_else(|_| start_dir.to_path_buf());
        let mut picker = Self {
            side,
            dir,
            entries: Vec::new(),
            state: ListState::default(),
            filter,
            error: None,
        };
        picker.refresh();
        picker
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Allow-list as currently toggled; a picked file is loaded under it
    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    /// Re-read the current directory
    pub fn refresh(&mut self) {
        self.entries.clear();
        if self.parent().is_some() {
            self.entries.push(PickerEntry::Parent);
        }

        match self.filter.list_dir(&self.dir) {
            Ok(paths) => {
                self.error = None;
                self.entries.extend(paths.into_iter().map(|path| {
                    if path.is_dir() {
                        PickerEntry::Dir(path)
                    } else {
                        PickerEntry::File(path)
                    }
                }));
            }
            Err(err) => self.error = Some(err.to_string()),
        }

        // Land on the first file when there is one, the top otherwise
        let first_file = self
            .entries
            .iter()
            .position(|e| matches!(e, PickerEntry::File(_)));
        let selection = first_file.or(if self.entries.is_empty() { None } else { Some(0) });
        self.state.select(selection);
    }

    pub fn move_up(&mut self) {
        if let Some(i) = self.state.selected() {
            self.state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn move_down(&mut self) {
        if let Some(i) = self.state.selected() {
            let last = self.entries.len().saturating_sub(1);
            self.state.select(Some((i + 1).min(last)));
        }
    }

    fn parent(&self) -> Option<PathBuf> {
        self.dir
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    pub fn go_parent(&mut self) {
        if let Some(parent) = self.parent() {
            self.dir = parent;
            self.refresh();
        }
    }

    pub fn toggle_all_files(&mut self) {
        self.filter.toggle_allow_all();
        self.refresh();
    }

    /// Open the selected directory or pick the selected file
    pub fn activate(&mut self) -> PickerOutcome {
        match self.selected().cloned() {
            Some(PickerEntry::Parent) => {
                self.go_parent();
                PickerOutcome::Pending
            }
            Some(PickerEntry::Dir(path)) => {
                self.dir = path;
                self.refresh();
                PickerOutcome::Pending
            }
            Some(PickerEntry::File(path)) => PickerOutcome::Selected(path),
            None => PickerOutcome::Pending,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PickerOutcome {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => PickerOutcome::Cancelled,
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                PickerOutcome::Pending
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down();
                PickerOutcome::Pending
            }
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                self.go_parent();
                PickerOutcome::Pending
            }
            KeyCode::Char('a') => {
                self.toggle_all_files();
                PickerOutcome::Pending
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.activate(),
            _ => PickerOutcome::Pending,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let filter_label = if self.filter.allows_all() {
            "all files".to_string()
        } else {
            self.filter.extensions().join(", ")
        };

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| match entry {
                PickerEntry::Parent => ListItem::new(Line::from(Span::styled(
                    "../",
                    Style::default().fg(Color::Rgb(150, 150, 150)),
                ))),
                PickerEntry::Dir(path) => ListItem::new(Line::from(Span::styled(
                    format!("{}/", file_name(path)),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                ))),
                PickerEntry::File(path) => ListItem::new(Line::from(Span::styled(
                    file_name(path),
                    Style::default().fg(Color::Rgb(220, 220, 220)),
                ))),
            })
            .collect();

        let title = format!(" Open {} file: {} ", self.side, self.dir.display());
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(title)
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .title_bottom(format!(
                        " [{}]  Enter: open  Backspace: up  a: toggle all files  Esc: cancel ",
                        filter_label
                    )),
            )
            .highlight_style(Style::default().bg(Color::Rgb(0, 50, 100)).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        f.render_widget(Clear, area);
        if let Some(error) = &self.error {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )))
            .block(Block::default().borders(Borders::ALL).title(" Open file "));
            f.render_widget(paragraph, area);
        } else {
            f.render_stateful_widget(list, area, &mut self.state);
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::fs;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_picker_selects_first_allowed_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "n").unwrap();
        fs::write(temp_dir.path().join("photo.png"), "p").unwrap();

        let root = temp_dir.path().canonicalize().unwrap();
        let mut picker = FilePicker::new(Side::Old, temp_dir.path(), FileFilter::default());

        assert!(!picker
            .entries()
            .iter()
            .any(|e| matches!(e, PickerEntry::File(p) if p.ends_with("photo.png"))));
        assert_eq!(
            picker.handle_key(&key(KeyCode::Enter)),
            PickerOutcome::Selected(root.join("notes.txt"))
        );
    }

    #[test]
    fn test_picker_navigates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let nested = root.join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("inner.md"), "i").unwrap();

        let mut picker = FilePicker::new(Side::New, temp_dir.path(), FileFilter::default());
        // Entries: "..", "nested/"; no files so selection starts at the top
        picker.move_down();
        assert_eq!(picker.activate(), PickerOutcome::Pending);
        assert_eq!(picker.dir(), nested.as_path());

        assert_eq!(
            picker.handle_key(&key(KeyCode::Enter)),
            PickerOutcome::Selected(nested.join("inner.md"))
        );

        picker.handle_key(&key(KeyCode::Backspace));
        assert_eq!(picker.dir(), root.as_path());
    }

    #[test]
    fn test_relative_start_dir_can_walk_up() {
        // Tests run from the package root, which contains src/
        let mut picker = FilePicker::new(Side::Old, "src", FileFilter::default());
        assert!(picker.dir().is_absolute());
        assert_eq!(picker.entries().first(), Some(&PickerEntry::Parent));

        picker.go_parent();
        assert!(picker.dir().is_absolute());
        assert!(picker.error.is_none());
        assert!(picker
            .entries()
            .iter()
            .any(|e| matches!(e, PickerEntry::Dir(p) if p.ends_with("src"))));
    }

    #[test]
    fn test_toggle_all_files_reveals_other_types() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("data.bin"), "b").unwrap();

        let mut picker = FilePicker::new(Side::Old, temp_dir.path(), FileFilter::default());
        assert!(!picker.entries().iter().any(|e| matches!(e, PickerEntry::File(_))));

        picker.handle_key(&key(KeyCode::Char('a')));
        assert!(picker.entries().iter().any(|e| matches!(e, PickerEntry::File(_))));
        assert_eq!(picker.handle_key(&key(KeyCode::Esc)), PickerOutcome::Cancelled);
    }
}
