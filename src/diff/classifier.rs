//! Modification classifier
//!
//! Post-processes a line-diff segment sequence into two annotated documents
//! and a flat change list. A removed segment immediately followed by an added
//! segment is folded into "modified" lines, paired by position: line `j` of the
//! removed block pairs with line `j` of the added block, whatever their
//! content. Surplus lines of the longer block stay plain removals/additions.

use super::generator::DiffGenerator;
use super::model::{
    AnnotatedLine, ChangeKind, ChangeSummary, Comparison, LineKind, Segment, SegmentKind,
};

/// Diff `old_text` against `new_text` with the default algorithm and classify the result.
pub fn classify(old_text: &str, new_text: &str) -> Comparison {
    DiffGenerator::default().compare(old_text, new_text)
}

/// Classify an already computed segment sequence.
pub fn classify_segments(segments: &[Segment]) -> Comparison {
    let mut builder = ComparisonBuilder::new();

    let mut i = 0;
    while i < segments.len() {
        let segment = &segments[i];
        match (segment.kind, segments.get(i + 1).map(|next| next.kind)) {
            (SegmentKind::Removed, Some(SegmentKind::Added)) => {
                builder.pair(&segment.lines(), &segments[i + 1].lines());
                i += 2;
            }
            (SegmentKind::Removed, _) => {
                for line in segment.lines() {
                    builder.removed(line);
                }
                i += 1;
            }
            (SegmentKind::Added, _) => {
                for line in segment.lines() {
                    builder.added(line);
                }
                i += 1;
            }
            (SegmentKind::Unchanged, _) => {
                for line in segment.lines() {
                    builder.unchanged(line);
                }
                i += 1;
            }
        }
    }

    builder.finish()
}

/// Accumulates both annotated sequences while tracking the two line counters.
struct ComparisonBuilder {
    old_line_num: usize,
    new_line_num: usize,
    comparison: Comparison,
}

impl ComparisonBuilder {
    fn new() -> Self {
        Self {
            old_line_num: 1,
            new_line_num: 1,
            comparison: Comparison::default(),
        }
    }

    fn pair(&mut self, removed: &[&str], added: &[&str]) {
        let span = removed.len().max(added.len());
        for j in 0..span {
            match (removed.get(j), added.get(j)) {
                (Some(old), Some(new)) => self.modified(old, new),
                (Some(old), None) => self.removed(old),
                (None, Some(new)) => self.added(new),
                (None, None) => unreachable!("index below the longer block length"),
            }
        }
    }

    fn modified(&mut self, old: &str, new: &str) {
        let old_number = self.next_old();
        let new_number = self.next_new();

        self.comparison.old_lines.push(AnnotatedLine {
            display_line_number: old_number,
            content: old.to_string(),
            kind: LineKind::Modified,
            old_line_number: Some(old_number),
            new_line_number: Some(new_number),
        });
        self.comparison.new_lines.push(AnnotatedLine {
            display_line_number: new_number,
            content: new.to_string(),
            kind: LineKind::Modified,
            old_line_number: Some(old_number),
            new_line_number: Some(new_number),
        });
        self.comparison.changes.push(ChangeSummary {
            kind: ChangeKind::Modified,
            content: new.to_string(),
            old_content: Some(old.to_string()),
            old_line_number: Some(old_number),
            new_line_number: Some(new_number),
        });
    }

    fn removed(&mut self, old: &str) {
        let old_number = self.next_old();

        self.comparison.old_lines.push(AnnotatedLine {
            display_line_number: old_number,
            content: old.to_string(),
            kind: LineKind::Removed,
            old_line_number: Some(old_number),
            new_line_number: None,
        });
        self.comparison.changes.push(ChangeSummary {
            kind: ChangeKind::Removed,
            content: old.to_string(),
            old_content: None,
            old_line_number: Some(old_number),
            new_line_number: None,
        });
    }

    fn added(&mut self, new: &str) {
        let new_number = self.next_new();

        self.comparison.new_lines.push(AnnotatedLine {
            display_line_number: new_number,
            content: new.to_string(),
            kind: LineKind::Added,
            old_line_number: None,
            new_line_number: Some(new_number),
        });
        self.comparison.changes.push(ChangeSummary {
            kind: ChangeKind::Added,
            content: new.to_string(),
            old_content: None,
            old_line_number: None,
            new_line_number: Some(new_number),
        });
    }

    fn unchanged(&mut self, line: &str) {
        let old_number = self.next_old();
        let new_number = self.next_new();

        self.comparison.old_lines.push(AnnotatedLine {
            display_line_number: old_number,
            content: line.to_string(),
            kind: LineKind::Unchanged,
            old_line_number: Some(old_number),
            new_line_number: Some(new_number),
        });
        self.comparison.new_lines.push(AnnotatedLine {
            display_line_number: new_number,
            content: line.to_string(),
            kind: LineKind::Unchanged,
            old_line_number: Some(old_number),
            new_line_number: Some(new_number),
        });
    }

    fn next_old(&mut self) -> usize {
        let number = self.old_line_num;
        self.old_line_num += 1;
        number
    }

    fn next_new(&mut self) -> usize {
        let number = self.new_line_num;
        self.new_line_num += 1;
        number
    }

    fn finish(self) -> Comparison {
        self.comparison
    }
}
