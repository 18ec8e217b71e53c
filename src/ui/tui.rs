use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use super::panes::{render_change_list, render_pane, PaneView};
use super::picker::{FilePicker, PickerOutcome};
use crate::config::SideDiffConfig;
use crate::core::{AppEvent, ComparisonSession, ComparisonWatcher, FileFilter, FileLoader, LoadEvent, Side};
use crate::diff::{Comparison, DiffAlgorithmType};
use crate::error::SideDiffError;
use crate::export::{ChangeExporter, ExportFormat};
use crate::highlight::SyntaxHighlighter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    OldPane,
    NewPane,
    Changes,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::OldPane => Focus::NewPane,
            Focus::NewPane => Focus::Changes,
            Focus::Changes => Focus::OldPane,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::OldPane => Focus::Changes,
            Focus::NewPane => Focus::OldPane,
            Focus::Changes => Focus::NewPane,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

/// Lines emphasised after a navigation, until `until` passes
#[derive(Debug, Clone, Copy)]
struct NavigationHighlight {
    old_index: Option<usize>,
    new_index: Option<usize>,
    until: Instant,
}

/// Screen areas from the last frame, used for mouse hit-testing and paging
#[derive(Debug, Clone, Copy, Default)]
struct Viewports {
    old: Rect,
    new: Rect,
    changes: Rect,
}

pub struct TuiApp {
    config: SideDiffConfig,
    session: ComparisonSession,
    loader: FileLoader,
    watcher: Option<ComparisonWatcher>,
    event_rx: Receiver<AppEvent>,
    exporter: ChangeExporter,
    highlighter: Option<SyntaxHighlighter>,
    languages: HashMap<Side, String>,
    requested: HashSet<Side>,
    focus: Focus,
    old_scroll: usize,
    new_scroll: usize,
    change_list: ListState,
    navigation: Option<NavigationHighlight>,
    picker: Option<FilePicker>,
    show_help: bool,
    status: Option<StatusMessage>,
    viewports: Viewports,
    sync_scroll: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(config: SideDiffConfig, filter: FileFilter, watch: bool) -> anyhow::Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let loader = FileLoader::new(filter, event_tx.clone());
        let watcher = if watch {
            Some(ComparisonWatcher::new(event_tx)?)
        } else {
            None
        };
        let highlighter = config
            .ui
            .syntax_highlighting
            .then(|| SyntaxHighlighter::new(config.cache.highlight_cache_size));

        Ok(Self {
            session: ComparisonSession::new(config.diff.algorithm),
            exporter: ChangeExporter::new(&config.export.directory),
            sync_scroll: config.ui.sync_scroll,
            config,
            loader,
            watcher,
            event_rx,
            highlighter,
            languages: HashMap::new(),
            requested: HashSet::new(),
            focus: Focus::OldPane,
            old_scroll: 0,
            new_scroll: 0,
            change_list: ListState::default(),
            navigation: None,
            picker: None,
            show_help: false,
            status: None,
            viewports: Viewports::default(),
            should_quit: false,
        })
    }

    pub fn session(&self) -> &ComparisonSession {
        &self.session
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn selected_change(&self) -> Option<usize> {
        self.change_list.selected()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn scroll(&self, side: Side) -> usize {
        match side {
            Side::Old => self.old_scroll,
            Side::New => self.new_scroll,
        }
    }

    /// Index of the line currently under the navigation highlight on `side`
    pub fn highlighted(&self, side: Side) -> Option<usize> {
        let highlight = self.navigation.filter(|h| Instant::now() < h.until)?;
        match side {
            Side::Old => highlight.old_index,
            Side::New => highlight.new_index,
        }
    }

    /// Request an asynchronous read of `path` into `side`
    pub fn open(&mut self, side: Side, path: PathBuf) {
        let filter = self.loader.filter().clone();
        self.open_with(side, path, filter);
    }

    /// Like [`TuiApp::open`], checked against `filter` rather than the configured allow-list
    fn open_with(&mut self, side: Side, path: PathBuf, filter: FileFilter) {
        self.set_status(StatusLevel::Info, format!("Loading {}...", path.display()));
        self.requested.insert(side);
        self.loader.request_with(side, path, filter);
    }

    pub fn open_picker(&mut self, side: Side) {
        let start_dir = self
            .session
            .document(side)
            .or_else(|| self.session.document(side.other()))
            .and_then(|doc| doc.path.parent().map(Path::to_path_buf))
            .filter(|dir| !dir.as_os_str().is_empty())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        self.picker = Some(FilePicker::new(side, start_dir, self.loader.filter().clone()));
    }

    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            // Completed loads and watcher notifications
            match self.event_rx.recv_timeout(Duration::from_millis(50)) {
                Ok(event) => {
                    self.handle_app_event(event);
                    while let Ok(event) = self.event_rx.try_recv() {
                        self.handle_app_event(event);
                    }
                }
                Err(_) => {} // Timeout, continue
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(&key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Load(load) => self.apply_load(load),
            AppEvent::FileChanged { side, path } => {
                tracing::info!("Reloading {} file after change", side);
                self.loader.reload(side, path);
            }
            AppEvent::Quit => self.should_quit = true,
        }
    }

    fn apply_load(&mut self, event: LoadEvent) {
        let side = event.side();
        self.requested.remove(&side);
        let path = match &event {
            LoadEvent::Loaded { document, .. } => document.path.clone(),
            LoadEvent::Failed { path, .. } => path.clone(),
        };

        let rebuilt = match self.session.apply(event) {
            Ok(rebuilt) => rebuilt,
            Err(err) => {
                self.set_status(StatusLevel::Error, err.to_string());
                return;
            }
        };

        if let Some(highlighter) = &self.highlighter {
            match highlighter.language_for_path(&path) {
                Some(language) => self.languages.insert(side, language),
                None => self.languages.remove(&side),
            };
        }

        if let Some(watcher) = self.watcher.as_mut() {
            if let Err(err) = watcher.watch(side, &path) {
                tracing::warn!("Cannot watch {}: {:#}", path.display(), err);
            }
        }

        if rebuilt {
            self.comparison_rebuilt();
        }

        let message = match self.session.comparison() {
            Some(comparison) if self.session.is_ready() => {
                let stats = comparison.stats();
                if stats.is_identical() {
                    format!("Loaded {}: no differences", path.display())
                } else {
                    format!(
                        "Loaded {}: {} modified, {} added, {} removed",
                        path.display(),
                        stats.modified,
                        stats.added,
                        stats.removed
                    )
                }
            }
            _ => format!("Loaded {}", path.display()),
        };
        self.set_status(StatusLevel::Info, message);
    }

    /// Keep scroll positions and the list selection inside the new comparison
    fn comparison_rebuilt(&mut self) {
        self.navigation = None;
        let Some(comparison) = self.session.comparison() else {
            return;
        };

        self.old_scroll = self.old_scroll.min(comparison.old_lines.len().saturating_sub(1));
        self.new_scroll = self.new_scroll.min(comparison.new_lines.len().saturating_sub(1));

        let selection = match (self.change_list.selected(), comparison.changes.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.change_list.select(selection);
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        if let Some(picker) = self.picker.as_mut() {
            let side = picker.side();
            match picker.handle_key(key) {
                PickerOutcome::Pending => {}
                PickerOutcome::Cancelled => self.picker = None,
                PickerOutcome::Selected(path) => {
                    let filter = picker.filter().clone();
                    self.picker = None;
                    self.open_with(side, path, filter);
                    let other = side.other();
                    if self.session.document(other).is_none() && !self.requested.contains(&other) {
                        self.open_picker(other);
                    }
                }
            }
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('h') | KeyCode::F(1) | KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        let page = self.config.ui.scroll_step.max(1);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::F(1) => self.show_help = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::PageUp => self.move_by(-(page as isize)),
            KeyCode::PageDown => self.move_by(page as isize),
            KeyCode::Home => self.move_by(isize::MIN),
            KeyCode::End => self.move_by(isize::MAX),
            KeyCode::Enter => {
                if let Some(index) = self.change_list.selected() {
                    self.navigate_to(index);
                }
            }
            KeyCode::Char('n') => self.step_change(true),
            KeyCode::Char('N') => self.step_change(false),
            KeyCode::Char('o') => self.open_picker(Side::Old),
            KeyCode::Char('p') => self.open_picker(Side::New),
            KeyCode::Char('e') => self.export(self.config.export.format),
            KeyCode::Char('c') => self.export(ExportFormat::Csv),
            KeyCode::Char('s') => {
                self.sync_scroll = !self.sync_scroll;
                let state = if self.sync_scroll { "on" } else { "off" };
                self.set_status(StatusLevel::Info, format!("Synchronized scrolling {}", state));
            }
            KeyCode::Char('a') => self.cycle_algorithm(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.picker.is_some() || self.show_help {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let area = self.viewports.changes;
                if !hit(area, mouse.column, mouse.row) {
                    return;
                }
                // Skip the top border
                let Some(row) = mouse.row.checked_sub(area.y + 1) else {
                    return;
                };
                let index = self.change_list.offset() + row as usize;
                let count = self.session.comparison().map_or(0, |c| c.changes.len());
                if index < count {
                    self.focus = Focus::Changes;
                    self.navigate_to(index);
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let delta = if mouse.kind == MouseEventKind::ScrollUp { -3 } else { 3 };
                if hit(self.viewports.old, mouse.column, mouse.row) {
                    self.scroll_pane(Side::Old, delta);
                } else if hit(self.viewports.new, mouse.column, mouse.row) {
                    self.scroll_pane(Side::New, delta);
                } else if hit(self.viewports.changes, mouse.column, mouse.row) {
                    self.select_by(delta.signum());
                }
            }
            _ => {}
        }
    }

    fn move_by(&mut self, delta: isize) {
        match self.focus {
            Focus::OldPane => self.scroll_pane(Side::Old, delta),
            Focus::NewPane => self.scroll_pane(Side::New, delta),
            Focus::Changes => self.select_by(delta),
        }
    }

    fn scroll_pane(&mut self, side: Side, delta: isize) {
        let Some(comparison) = self.session.comparison() else {
            return;
        };
        let old_max = comparison.old_lines.len().saturating_sub(1);
        let new_max = comparison.new_lines.len().saturating_sub(1);

        if self.sync_scroll {
            self.old_scroll = offset(self.old_scroll, delta, old_max);
            self.new_scroll = offset(self.new_scroll, delta, new_max);
        } else {
            match side {
                Side::Old => self.old_scroll = offset(self.old_scroll, delta, old_max),
                Side::New => self.new_scroll = offset(self.new_scroll, delta, new_max),
            }
        }
    }

    fn select_by(&mut self, delta: isize) {
        let count = self.session.comparison().map_or(0, |c| c.changes.len());
        if count == 0 {
            return;
        }
        let current = self.change_list.selected().unwrap_or(0);
        self.change_list.select(Some(offset(current, delta, count - 1)));
    }

    fn step_change(&mut self, forward: bool) {
        let Some(comparison) = self.session.comparison() else {
            return;
        };
        let current = self.change_list.selected();
        let target = if forward {
            comparison.next_change_index(current)
        } else {
            comparison.previous_change_index(current)
        };
        if let Some(index) = target {
            self.navigate_to(index);
        }
    }

    /// Select change `index`, scroll both panes to it and highlight its lines
    pub fn navigate_to(&mut self, index: usize) {
        let Some(comparison) = self.session.comparison() else {
            return;
        };
        let Some(change) = comparison.changes.get(index) else {
            return;
        };

        let location = comparison.locate(change);
        if location.is_empty() {
            tracing::warn!("Change {} has no matching lines", index);
            return;
        }
        tracing::debug!(
            "Navigating to {} change {:?}:{:?}",
            change.kind,
            change.old_line_number,
            change.new_line_number
        );

        if let Some(i) = location.old_index {
            self.old_scroll = center(i, inner_height(self.viewports.old));
        }
        if let Some(i) = location.new_index {
            self.new_scroll = center(i, inner_height(self.viewports.new));
        }

        self.change_list.select(Some(index));
        self.navigation = Some(NavigationHighlight {
            old_index: location.old_index,
            new_index: location.new_index,
            until: Instant::now() + self.config.ui.highlight_duration(),
        });
    }

    fn cycle_algorithm(&mut self) {
        let all = DiffAlgorithmType::all();
        let current = self.session.algorithm();
        let position = all.iter().position(|a| *a == current).unwrap_or(0);
        let next = all[(position + 1) % all.len()];

        if self.session.set_algorithm(next) {
            self.comparison_rebuilt();
        }
        self.set_status(StatusLevel::Info, format!("Algorithm: {}", next));
    }

    pub fn export(&mut self, format: ExportFormat) {
        let changes = self
            .session
            .comparison()
            .map(|c| c.changes.as_slice())
            .unwrap_or_default();
        let count = changes.len();

        match self.exporter.export(changes, format) {
            Ok(path) => {
                let at = chrono::Local::now().format("%H:%M:%S");
                self.set_status(
                    StatusLevel::Info,
                    format!("[{}] Exported {} changes to {}", at, count, path.display()),
                );
            }
            Err(SideDiffError::NothingToExport) => {
                self.set_status(StatusLevel::Warning, "Nothing to export: the change list is empty");
            }
            Err(err) => {
                tracing::error!("Export failed: {}", err);
                self.set_status(StatusLevel::Error, format!("Export failed: {}", err));
            }
        }
    }

    fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
        });
    }

    fn ui(&mut self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4)])
            .split(f.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(37), // Old pane
                Constraint::Percentage(37), // New pane
                Constraint::Percentage(26), // Change list
            ])
            .split(rows[0]);

        self.viewports = Viewports {
            old: columns[0],
            new: columns[1],
            changes: columns[2],
        };

        self.render_panes(f);
        let focused = self.focus == Focus::Changes;
        let changes = self
            .session
            .comparison()
            .map(|c| c.changes.as_slice())
            .unwrap_or_default();
        render_change_list(f, columns[2], changes, &mut self.change_list, focused);
        self.render_status(f, rows[1]);

        if let Some(picker) = self.picker.as_mut() {
            picker.render(f, centered_rect(70, 70, f.area()));
        } else if self.show_help {
            self.render_help(f);
        }
    }

    fn render_panes(&mut self, f: &mut Frame) {
        let old_highlight = self.highlighted(Side::Old);
        let new_highlight = self.highlighted(Side::New);
        let show_line_numbers = self.config.ui.show_line_numbers;

        for (side, area, scroll, highlighted) in [
            (Side::Old, self.viewports.old, self.old_scroll, old_highlight),
            (Side::New, self.viewports.new, self.new_scroll, new_highlight),
        ] {
            let title = match self.session.document(side) {
                Some(doc) => format!(" {}: {} ", side_title(side), doc.file_name()),
                None => format!(" {} ", side_title(side)),
            };
            let placeholder = match (side, self.requested.contains(&side)) {
                (_, true) => "Loading...",
                (Side::Old, false) => "Press o to open the old file",
                (Side::New, false) => "Press p to open the new file",
            };
            let lines = self
                .session
                .comparison()
                .map(|c| pane_lines(c, side))
                .unwrap_or_default();
            let focus = match side {
                Side::Old => Focus::OldPane,
                Side::New => Focus::NewPane,
            };

            let view = PaneView {
                title,
                lines,
                scroll,
                focused: self.focus == focus,
                highlighted,
                show_line_numbers,
                placeholder,
            };
            let syntax = match (self.highlighter.as_mut(), self.languages.get(&side)) {
                (Some(highlighter), Some(language)) => Some((highlighter, language.as_str())),
                _ => None,
            };
            render_pane(f, area, view, syntax);
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let dim = Style::default().fg(Color::Rgb(150, 150, 150));
        let name = |side: Side| {
            self.session
                .document(side)
                .map(|d| d.file_name())
                .unwrap_or_else(|| "-".to_string())
        };

        let mut summary = vec![
            Span::styled(name(Side::Old), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(" ↔ ", dim),
            Span::styled(name(Side::New), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" | {} ", self.session.algorithm()), dim),
        ];
        if let Some(comparison) = self.session.comparison() {
            let stats = comparison.stats();
            summary.extend([
                Span::styled("| ", dim),
                Span::styled(format!("~{} ", stats.modified), Style::default().fg(Color::Yellow)),
                Span::styled(format!("+{} ", stats.added), Style::default().fg(Color::Green)),
                Span::styled(format!("-{} ", stats.removed), Style::default().fg(Color::Red)),
            ]);
        }
        if self.sync_scroll {
            summary.push(Span::styled("| sync", dim));
        }

        let message = match &self.status {
            Some(status) => {
                let color = match status.level {
                    StatusLevel::Info => Color::Rgb(200, 200, 200),
                    StatusLevel::Warning => Color::Yellow,
                    StatusLevel::Error => Color::Red,
                };
                Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
            }
            None => Line::from(vec![
                Span::styled("Press ", dim),
                Span::styled(" h ", Style::default().fg(Color::White).bg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(" for help, ", dim),
                Span::styled(" o ", Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)),
                Span::styled("/", dim),
                Span::styled(" p ", Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)),
                Span::styled(" to open files, ", dim),
                Span::styled(" q ", Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled(" to quit", dim),
            ]),
        };

        let status = Paragraph::new(vec![Line::from(summary), message]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(80, 80, 80)))
                .title(" Status ")
                .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        );

        f.render_widget(status, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let popup_area = centered_rect(70, 70, f.area());
        let key = |keys: &'static str, color: Color, text: &'static str| {
            Line::from(vec![
                Span::styled(keys, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(text),
            ])
        };

        let help_text = vec![
            Line::from(vec![Span::styled(
                "SideDiff - Side-by-side Text Comparison",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from("Keyboard Shortcuts:"),
            Line::from(""),
            key("  q, Esc     ", Color::Red, "- Quit the application"),
            key("  h, F1      ", Color::Green, "- Show/hide this help"),
            key("  Tab        ", Color::Blue, "- Cycle focus: old pane, new pane, change list"),
            key("  ↑↓, j/k    ", Color::Blue, "- Scroll the focused pane or move the selection"),
            key("  PgUp/PgDn  ", Color::Blue, "- Scroll a page"),
            key("  Home/End   ", Color::Blue, "- Jump to the top/bottom"),
            key("  Enter      ", Color::Yellow, "- Go to the selected change"),
            key("  n / N      ", Color::Yellow, "- Next/previous change"),
            key("  o / p      ", Color::Magenta, "- Open the old/new file"),
            key("  e          ", Color::Magenta, "- Export the change list (configured format)"),
            key("  c          ", Color::Magenta, "- Export the change list as CSV"),
            key("  s          ", Color::Cyan, "- Toggle synchronized scrolling"),
            key("  a          ", Color::Cyan, "- Cycle the diff algorithm"),
            Line::from(""),
            Line::from("Mouse: click a change to jump to it, wheel scrolls the pane under the cursor."),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, popup_area);
        f.render_widget(paragraph, popup_area);
    }
}

fn side_title(side: Side) -> &'static str {
    match side {
        Side::Old => "Old",
        Side::New => "New",
    }
}

fn pane_lines(comparison: &Comparison, side: Side) -> &[crate::diff::AnnotatedLine] {
    match side {
        Side::Old => &comparison.old_lines,
        Side::New => &comparison.new_lines,
    }
}

fn offset(current: usize, delta: isize, max: usize) -> usize {
    let moved = if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    moved.min(max)
}

/// Scroll position that puts `index` in the middle of a pane of `height` rows
fn center(index: usize, height: usize) -> usize {
    index.saturating_sub(height / 2)
}

fn inner_height(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

fn hit(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<(), io::Error> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoadedDocument;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn app(export_dir: &Path) -> TuiApp {
        let mut config = SideDiffConfig::default();
        config.ui.syntax_highlighting = false;
        config.export.directory = export_dir.to_path_buf();
        TuiApp::new(config, FileFilter::default(), false).unwrap()
    }

    fn load(app: &mut TuiApp, side: Side, name: &str, text: &str) {
        let document = LoadedDocument::new(PathBuf::from(name), text.to_string());
        app.handle_app_event(AppEvent::Load(LoadEvent::Loaded { side, document }));
    }

    fn press(app: &mut TuiApp, code: KeyCode) {
        app.handle_key(&KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn draw(app: &mut TuiApp) {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.ui(f)).unwrap();
    }

    fn next_event(app: &TuiApp) -> AppEvent {
        app.event_rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    fn numbered(count: usize, changed_at: Option<usize>) -> String {
        (1..=count)
            .map(|i| match changed_at {
                Some(at) if at == i => format!("changed {}", i),
                _ => format!("line {}", i),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_loading_both_sides_builds_change_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());

        load(&mut app, Side::Old, "a.txt", "a\nb");
        assert!(app.session().comparison().is_none());
        assert_eq!(app.selected_change(), None);

        load(&mut app, Side::New, "b.txt", "a\nc");
        assert_eq!(app.session().comparison().unwrap().changes.len(), 1);
        assert_eq!(app.selected_change(), Some(0));
        assert!(app.status().unwrap().text.contains("1 modified"));
    }

    #[test]
    fn test_picker_all_files_toggle_applies_to_the_load() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("server.log"), "started\nready").unwrap();
        let mut app = app(temp_dir.path());
        app.picker = Some(FilePicker::new(Side::Old, temp_dir.path(), FileFilter::default()));

        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        let event = next_event(&app);
        app.handle_app_event(event);

        let document = app.session().document(Side::Old).unwrap();
        assert!(document.path.ends_with("server.log"));
        assert_eq!(document.text, "started\nready");
        assert_ne!(app.status().unwrap().level, StatusLevel::Error);
    }

    #[test]
    fn test_failed_load_sets_error_status() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());

        app.handle_app_event(AppEvent::Load(LoadEvent::Failed {
            side: Side::Old,
            path: PathBuf::from("bad.txt"),
            error: SideDiffError::InvalidEncoding {
                path: PathBuf::from("bad.txt"),
            },
        }));

        let status = app.status().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert!(app.session().document(Side::Old).is_none());
    }

    #[test]
    fn test_navigation_scrolls_and_highlights() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", &numbered(200, None));
        load(&mut app, Side::New, "b.txt", &numbered(200, Some(150)));
        draw(&mut app);

        press(&mut app, KeyCode::Enter);

        let height = inner_height(app.viewports.old);
        for side in [Side::Old, Side::New] {
            let scroll = app.scroll(side);
            assert!(scroll <= 149 && 149 < scroll + height);
            assert_eq!(app.highlighted(side), Some(149));
        }
    }

    #[test]
    fn test_next_change_wraps() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", "a\nb\nc\nd");
        load(&mut app, Side::New, "b.txt", "x\nb\nc\ny");
        assert_eq!(app.session().comparison().unwrap().changes.len(), 2);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.selected_change(), Some(1));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.selected_change(), Some(0));
        press(&mut app, KeyCode::Char('N'));
        assert_eq!(app.selected_change(), Some(1));
    }

    #[test]
    fn test_click_on_change_row_navigates() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", "a\nb\nc\nd");
        load(&mut app, Side::New, "b.txt", "x\nb\nc\ny");
        draw(&mut app);

        let area = app.viewports.changes;
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: area.x + 2,
            row: area.y + 2,
            modifiers: KeyModifiers::NONE,
        });

        assert_eq!(app.selected_change(), Some(1));
        assert_eq!(app.highlighted(Side::New), Some(3));
    }

    #[test]
    fn test_export_without_changes_warns() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", "same");
        load(&mut app, Side::New, "b.txt", "same");

        press(&mut app, KeyCode::Char('e'));

        assert_eq!(app.status().unwrap().level, StatusLevel::Warning);
        assert!(!temp_dir.path().join("diff_changes.xlsx").exists());
    }

    #[test]
    fn test_export_writes_csv() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", "a\nb");
        load(&mut app, Side::New, "b.txt", "a\nc");

        press(&mut app, KeyCode::Char('c'));

        assert!(temp_dir.path().join("diff_changes.csv").exists());
        assert!(app.status().unwrap().text.contains("Exported 1 changes"));
    }

    #[test]
    fn test_sync_scroll_moves_both_panes() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", &numbered(50, None));
        load(&mut app, Side::New, "b.txt", &numbered(50, Some(3)));

        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.scroll(Side::Old), 10);
        assert_eq!(app.scroll(Side::New), 10);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll(Side::Old), 9);
        assert_eq!(app.scroll(Side::New), 10);
    }

    #[test]
    fn test_help_and_quit_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());

        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_cycle_algorithm_keeps_comparison() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", "a\nb");
        load(&mut app, Side::New, "b.txt", "a\nc");

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.session().algorithm(), DiffAlgorithmType::Patience);
        assert_eq!(app.session().revision(), 2);
        assert_eq!(app.selected_change(), Some(0));
    }

    #[test]
    fn test_renders_panes_and_status() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = app(temp_dir.path());
        load(&mut app, Side::Old, "a.txt", "alpha\nbeta");
        load(&mut app, Side::New, "b.txt", "alpha\ngamma");

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.ui(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        assert!(text.contains("Old: a.txt"));
        assert!(text.contains("New: b.txt"));
        assert!(text.contains("Changes (1)"));
    }
}
