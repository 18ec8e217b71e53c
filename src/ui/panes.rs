use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
    Frame,
};

use crate::diff::{AnnotatedLine, ChangeKind, ChangeSummary, LineKind};
use crate::highlight::SyntaxHighlighter;

const BORDER: Color = Color::Rgb(80, 80, 80);
const GUTTER: Color = Color::Rgb(100, 100, 100);

/// Everything needed to draw one document pane
pub struct PaneView<'a> {
    pub title: String,
    pub lines: &'a [AnnotatedLine],
    pub scroll: usize,
    pub focused: bool,
    /// Index of the line under the transient navigation highlight
    pub highlighted: Option<usize>,
    pub show_line_numbers: bool,
    pub placeholder: &'a str,
}

pub fn kind_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Added => Style::default().fg(Color::Rgb(150, 255, 150)).bg(Color::Rgb(0, 40, 0)),
        LineKind::Removed => Style::default().fg(Color::Rgb(255, 150, 150)).bg(Color::Rgb(40, 0, 0)),
        LineKind::Modified => Style::default().fg(Color::Rgb(255, 230, 150)).bg(Color::Rgb(40, 40, 0)),
        LineKind::Unchanged => Style::default().fg(Color::Rgb(200, 200, 200)),
    }
}

fn change_color(kind: ChangeKind) -> Color {
    match kind {
        ChangeKind::Added => Color::Green,
        ChangeKind::Removed => Color::Red,
        ChangeKind::Modified => Color::Yellow,
    }
}

fn navigation_style() -> Style {
    Style::default().bg(Color::Rgb(0, 70, 140)).add_modifier(Modifier::BOLD)
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Cyan } else { BORDER };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}

/// Draw a document pane. `syntax` carries the highlighter and the document's language.
pub fn render_pane(
    f: &mut Frame,
    area: Rect,
    view: PaneView<'_>,
    mut syntax: Option<(&mut SyntaxHighlighter, &str)>,
) {
    let block = pane_block(view.title, view.focused);
    let visible_height = block.inner(area).height as usize;

    if view.lines.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            view.placeholder.to_string(),
            Style::default().fg(Color::Gray),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let start = view.scroll.min(view.lines.len().saturating_sub(1));
    let end = (start + visible_height).min(view.lines.len());

    let mut rows: Vec<Line<'static>> = Vec::with_capacity(end - start);
    for (index, line) in view.lines[start..end].iter().enumerate() {
        let index = start + index;
        let base = kind_style(line.kind);
        let emphasis = if view.highlighted == Some(index) {
            Some(navigation_style())
        } else {
            None
        };
        let finish = |style: Style| match emphasis {
            Some(over) => style.patch(over),
            None => style,
        };

        let mut spans = Vec::new();
        if view.show_line_numbers {
            spans.push(Span::styled(
                format!("{:>4} ", line.display_line_number),
                finish(Style::default().fg(GUTTER)),
            ));
        }
        spans.push(Span::styled(format!("{} ", line.kind.symbol()), finish(base)));

        match syntax.as_mut() {
            Some((highlighter, language)) => {
                for (style, text) in highlighter.highlight_line(&line.content, language) {
                    spans.push(Span::styled(text, finish(base.patch(style))));
                }
            }
            None => spans.push(Span::styled(line.content.clone(), finish(base))),
        }

        rows.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(rows).block(block), area);

    if view.lines.len() > visible_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(view.lines.len()).position(start);
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar_state,
        );
    }
}

/// One change list row: kind symbol, old:new location and content preview
pub fn change_item(change: &ChangeSummary) -> ListItem<'static> {
    let color = change_color(change.kind);
    let number = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());

    let mut spans = vec![
        Span::styled(
            format!(" {} ", change.kind.label().chars().next().unwrap_or(' ').to_ascii_uppercase()),
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {:>4}:{:<4} ", number(change.old_line_number), number(change.new_line_number)),
            Style::default().fg(GUTTER),
        ),
    ];

    match change.kind {
        ChangeKind::Modified => {
            spans.push(Span::styled(
                change.old_content.clone().unwrap_or_default(),
                Style::default().fg(Color::Rgb(255, 150, 150)),
            ));
            spans.push(Span::styled(" → ", Style::default().fg(GUTTER)));
            spans.push(Span::styled(
                change.content.clone(),
                Style::default().fg(Color::Rgb(150, 255, 150)),
            ));
        }
        _ => spans.push(Span::styled(change.content.clone(), Style::default().fg(color))),
    }

    ListItem::new(Line::from(spans))
}

pub fn render_change_list(
    f: &mut Frame,
    area: Rect,
    changes: &[ChangeSummary],
    state: &mut ListState,
    focused: bool,
) {
    let title = format!(" Changes ({}) ", changes.len());
    let block = pane_block(title, focused);

    if changes.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No differences",
            Style::default().fg(Color::Gray),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = changes.iter().map(change_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(0, 50, 100)).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(list, area, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::classify;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_pane_renders_numbers_and_content() {
        let comparison = classify("alpha\nbeta", "alpha\ngamma");
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();

        terminal
            .draw(|f| {
                let view = PaneView {
                    title: " New ".to_string(),
                    lines: &comparison.new_lines,
                    scroll: 0,
                    focused: true,
                    highlighted: Some(1),
                    show_line_numbers: true,
                    placeholder: "empty",
                };
                render_pane(f, f.area(), view, None);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("1 "));
        assert!(text.contains("alpha"));
        assert!(text.contains("~ gamma"));
    }

    #[test]
    fn test_change_list_renders_modification() {
        let comparison = classify("a\nold", "a\nnew");
        let mut terminal = Terminal::new(TestBackend::new(50, 5)).unwrap();
        let mut state = ListState::default();
        state.select(Some(0));

        terminal
            .draw(|f| render_change_list(f, f.area(), &comparison.changes, &mut state, true))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Changes (1)"));
        assert!(text.contains("old"));
        assert!(text.contains("new"));
    }

    #[test]
    fn test_kind_styles_differ() {
        assert_ne!(kind_style(LineKind::Added), kind_style(LineKind::Removed));
        assert_ne!(kind_style(LineKind::Modified), kind_style(LineKind::Unchanged));
    }
}
