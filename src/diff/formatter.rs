use std::path::Path;
use super::model::{AnnotatedLine, ChangeKind, ChangeSummary, Comparison, LineKind};

/// Different plain-text output formats for a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFormat {
    /// Both documents in two columns
    SideBySide,
    /// One block per change with old and new content
    ChangeList,
    /// One line per change
    Compact,
}

/// Formats comparisons into text representations
pub struct DiffFormatter;

impl DiffFormatter {
    /// Format a comparison in the requested format
    pub fn format<P: AsRef<Path>>(
        comparison: &Comparison,
        format: DiffFormat,
        old_path: P,
        new_path: P,
        width: usize,
        color: bool,
    ) -> String {
        match format {
            DiffFormat::SideBySide => Self::format_side_by_side(comparison, old_path, new_path, width),
            DiffFormat::ChangeList => Self::format_change_list(comparison, old_path, new_path, color),
            DiffFormat::Compact => Self::format_compact(comparison),
        }
    }

    /// Render the two annotated sequences next to each other.
    ///
    /// Rows are aligned by emission order: unchanged and modified lines share a
    /// row, pure additions and removals leave the opposite column blank.
    pub fn format_side_by_side<P: AsRef<Path>>(
        comparison: &Comparison,
        old_path: P,
        new_path: P,
        width: usize,
    ) -> String {
        let half_width = width.saturating_sub(3) / 2; // Account for separator " | "

        let mut output = Vec::new();
        output.push(format!(
            "{} | {}",
            fit(&format!("--- {}", old_path.as_ref().display()), half_width),
            format!("+++ {}", new_path.as_ref().display())
        ));
        output.push("-".repeat(width));

        for (left, right) in align_rows(comparison) {
            let left = left.map(|line| cell(line)).unwrap_or_default();
            let right = right.map(|line| cell(line)).unwrap_or_default();
            output.push(format!("{} | {}", fit(&left, half_width), truncate(&right, half_width)));
        }

        output.join("\n")
    }

    /// Render each change with its line numbers and content
    pub fn format_change_list<P: AsRef<Path>>(
        comparison: &Comparison,
        old_path: P,
        new_path: P,
        color: bool,
    ) -> String {
        let mut output = Vec::new();
        output.push(format!("--- {}", old_path.as_ref().display()));
        output.push(format!("+++ {}", new_path.as_ref().display()));
        output.push(format!("Changes: {}", Self::format_stats(comparison)));

        for change in &comparison.changes {
            output.push(String::new());
            output.push(format!("[{}] {}", change.kind.label().to_uppercase(), location_label(change)));
            if let Some(old) = change.old_text() {
                output.push(paint(&format!("- {}", old), "\x1b[31m", color));
            }
            if let Some(new) = change.new_text() {
                output.push(paint(&format!("+ {}", new), "\x1b[32m", color));
            }
        }

        output.join("\n")
    }

    /// One line per change: kind letter, location and content
    pub fn format_compact(comparison: &Comparison) -> String {
        comparison
            .changes
            .iter()
            .map(|change| {
                let letter = match change.kind {
                    ChangeKind::Added => "A",
                    ChangeKind::Removed => "R",
                    ChangeKind::Modified => "M",
                };
                match change.kind {
                    ChangeKind::Modified => format!(
                        "{} {} {} -> {}",
                        letter,
                        location_label(change),
                        change.old_content.as_deref().unwrap_or_default(),
                        change.content
                    ),
                    _ => format!("{} {} {}", letter, location_label(change), change.content),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format change statistics
    pub fn format_stats(comparison: &Comparison) -> String {
        let stats = comparison.stats();
        if stats.is_identical() {
            "no differences".to_string()
        } else {
            format!(
                "{} modified, {} added, {} removed",
                stats.modified, stats.added, stats.removed
            )
        }
    }
}

/// Pair old and new lines into display rows following emission order.
pub fn align_rows(comparison: &Comparison) -> Vec<(Option<&AnnotatedLine>, Option<&AnnotatedLine>)> {
    let mut rows = Vec::new();
    let mut old_iter = comparison.old_lines.iter().peekable();
    let mut new_iter = comparison.new_lines.iter().peekable();

    loop {
        match (old_iter.peek(), new_iter.peek()) {
            (None, None) => break,
            (Some(old), _) if old.kind == LineKind::Removed => {
                rows.push((old_iter.next(), None));
            }
            (_, Some(new)) if new.kind == LineKind::Added => {
                rows.push((None, new_iter.next()));
            }
            _ => rows.push((old_iter.next(), new_iter.next())),
        }
    }

    rows
}

fn cell(line: &AnnotatedLine) -> String {
    format!("{:>4} {} {}", line.display_line_number, line.kind.symbol(), line.content)
}

fn location_label(change: &ChangeSummary) -> String {
    let side = |number: Option<usize>| number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
    format!("{}:{}", side(change.old_line_number), side(change.new_line_number))
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("{}{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

fn fit(text: &str, width: usize) -> String {
    format!("{:width$}", truncate(text, width), width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::classify;

    #[test]
    fn test_side_by_side_aligns_modifications() {
        let comparison = classify("line1\nline2\nline3", "line1\nchanged\nline3");
        let output = DiffFormatter::format_side_by_side(&comparison, "old.txt", "new.txt", 80);

        assert!(output.contains("--- old.txt"));
        assert!(output.contains("+++ new.txt"));
        let row = output.lines().find(|l| l.contains("line2")).unwrap();
        assert!(row.contains("changed"));
    }

    #[test]
    fn test_align_rows_gives_additions_their_own_row() {
        let comparison = classify("a\nb", "a\nnew\nb");
        let rows = align_rows(&comparison);

        assert_eq!(rows.len(), 3);
        assert!(rows[1].0.is_none());
        assert_eq!(rows[1].1.unwrap().content, "new");
    }

    #[test]
    fn test_change_list_without_color() {
        let comparison = classify("keep\nold", "keep\nnew\nextra");
        let output = DiffFormatter::format_change_list(&comparison, "a", "b", false);

        assert!(output.contains("[MODIFIED] 2:2"));
        assert!(output.contains("- old"));
        assert!(output.contains("+ new"));
        assert!(output.contains("[ADDED] -:3"));
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_compact_format() {
        let comparison = classify("a\nb\nc", "a\nx\nc");
        assert_eq!(DiffFormatter::format_compact(&comparison), "M 2:2 b -> x");
    }

    #[test]
    fn test_stats_for_identical_input() {
        let comparison = classify("same", "same");
        assert_eq!(DiffFormatter::format_stats(&comparison), "no differences");
    }
}
