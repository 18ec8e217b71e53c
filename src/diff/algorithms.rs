use similar::{Algorithm, ChangeTag, TextDiff};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::model::{Segment, SegmentKind};

/// Trait defining a line-diff primitive
pub trait DiffAlgorithm: Send + Sync {
    /// Produce the ordered segment sequence turning `old` into `new`
    fn segments(&self, old: &str, new: &str) -> Vec<Segment>;

    /// Get the algorithm name
    fn name(&self) -> &'static str;
}

/// Myers diff algorithm implementation
pub struct MyersAlgorithm;

impl DiffAlgorithm for MyersAlgorithm {
    fn segments(&self, old: &str, new: &str) -> Vec<Segment> {
        diff_with(Algorithm::Myers, old, new)
    }

    fn name(&self) -> &'static str {
        "Myers"
    }
}

/// Patience diff algorithm implementation
pub struct PatienceAlgorithm;

impl DiffAlgorithm for PatienceAlgorithm {
    fn segments(&self, old: &str, new: &str) -> Vec<Segment> {
        diff_with(Algorithm::Patience, old, new)
    }

    fn name(&self) -> &'static str {
        "Patience"
    }
}

/// LCS (Longest Common Subsequence) diff algorithm
pub struct LcsAlgorithm;

impl DiffAlgorithm for LcsAlgorithm {
    fn segments(&self, old: &str, new: &str) -> Vec<Segment> {
        diff_with(Algorithm::Lcs, old, new)
    }

    fn name(&self) -> &'static str {
        "LCS"
    }
}

/// Split text into lines. `\n` and `\r\n` both terminate a line and a
/// trailing terminator does not start a new one.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

// Diff the line slices with `similar` and merge consecutive changes of the
// same tag into segments.
fn diff_with(algorithm: Algorithm, old: &str, new: &str) -> Vec<Segment> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    let diff = TextDiff::configure()
        .algorithm(algorithm)
        .diff_slices(&old_lines, &new_lines);

    let mut segments: Vec<Segment> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => SegmentKind::Unchanged,
            ChangeTag::Delete => SegmentKind::Removed,
            ChangeTag::Insert => SegmentKind::Added,
        };

        match segments.last_mut() {
            Some(last) if last.kind == kind => {
                last.text.push_str(change.value());
                last.text.push('\n');
            }
            _ => {
                let mut text = change.value().to_string();
                text.push('\n');
                segments.push(Segment::new(kind, text));
            }
        }
    }

    segments
}

/// Available diff algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithmType {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl DiffAlgorithmType {
    pub fn all() -> &'static [DiffAlgorithmType] {
        &[Self::Myers, Self::Patience, Self::Lcs]
    }

    pub fn create(&self) -> Box<dyn DiffAlgorithm> {
        match self {
            Self::Myers => Box::new(MyersAlgorithm),
            Self::Patience => Box::new(PatienceAlgorithm),
            Self::Lcs => Box::new(LcsAlgorithm),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Myers => "Myers",
            Self::Patience => "Patience",
            Self::Lcs => "LCS",
        }
    }
}

impl std::fmt::Display for DiffAlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
        segments.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_replaced_line_yields_removed_then_added() {
        let segments = MyersAlgorithm.segments("a\nb\nc", "a\nx\nc");

        assert_eq!(
            kinds(&segments),
            vec![
                SegmentKind::Unchanged,
                SegmentKind::Removed,
                SegmentKind::Added,
                SegmentKind::Unchanged,
            ]
        );
        assert_eq!(segments[1].text, "b\n");
        assert_eq!(segments[2].text, "x\n");
    }

    #[test]
    fn test_missing_trailing_newline_is_not_a_change() {
        let segments = MyersAlgorithm.segments("a\nb", "a\nb\nc");

        assert_eq!(kinds(&segments), vec![SegmentKind::Unchanged, SegmentKind::Added]);
        assert_eq!(segments[0].text, "a\nb\n");
        assert_eq!(segments[1].text, "c\n");
    }

    #[test]
    fn test_line_endings_are_normalized() {
        let segments = MyersAlgorithm.segments("one\r\ntwo\r\n", "one\ntwo\n");
        assert_eq!(kinds(&segments), vec![SegmentKind::Unchanged]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(MyersAlgorithm.segments("", "").is_empty());

        let segments = LcsAlgorithm.segments("", "x\ny");
        assert_eq!(kinds(&segments), vec![SegmentKind::Added]);
        assert_eq!(segments[0].text, "x\ny\n");
    }

    #[test]
    fn test_all_algorithms_agree_on_simple_input() {
        for algorithm in DiffAlgorithmType::all() {
            let segments = algorithm.create().segments("keep\ndrop\n", "keep\n");
            assert_eq!(
                kinds(&segments),
                vec![SegmentKind::Unchanged, SegmentKind::Removed],
                "algorithm {}",
                algorithm
            );
        }
    }
}
