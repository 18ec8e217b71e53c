use serde::{Deserialize, Serialize};

/// Classification of a segment produced by the line-diff primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Unchanged,
    Removed,
    Added,
}

/// A maximal run of lines sharing one classification.
///
/// Every line of `text` is terminated by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }

    /// Non-empty lines of the block, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().filter(|line| !line.is_empty()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl LineKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
            Self::Modified => '~',
            Self::Unchanged => ' ',
        }
    }
}

/// One line of either document, tagged with its classification and position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedLine {
    pub display_line_number: usize,
    pub content: String,
    pub kind: LineKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<usize>,
}

/// Kind of a user-facing change entry. Unchanged lines never produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One logical change event: an addition, a removal or a paired modification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub kind: ChangeKind,
    /// New content for added/modified entries, removed content for removals
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<usize>,
}

impl ChangeSummary {
    /// Content as it appears in the old document, if any
    pub fn old_text(&self) -> Option<&str> {
        match self.kind {
            ChangeKind::Removed => Some(&self.content),
            ChangeKind::Modified => self.old_content.as_deref(),
            ChangeKind::Added => None,
        }
    }

    /// Content as it appears in the new document, if any
    pub fn new_text(&self) -> Option<&str> {
        match self.kind {
            ChangeKind::Added | ChangeKind::Modified => Some(&self.content),
            ChangeKind::Removed => None,
        }
    }
}

/// Counts of each line classification in a comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl ComparisonStats {
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.modified
    }

    pub fn is_identical(&self) -> bool {
        self.total_changes() == 0
    }
}

/// Result of a classification run: both annotated documents plus the change list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub old_lines: Vec<AnnotatedLine>,
    pub new_lines: Vec<AnnotatedLine>,
    pub changes: Vec<ChangeSummary>,
}

impl Comparison {
    pub fn stats(&self) -> ComparisonStats {
        let mut stats = ComparisonStats::default();
        for change in &self.changes {
            match change.kind {
                ChangeKind::Added => stats.added += 1,
                ChangeKind::Removed => stats.removed += 1,
                ChangeKind::Modified => stats.modified += 1,
            }
        }
        stats.unchanged = self
            .old_lines
            .iter()
            .filter(|line| line.kind == LineKind::Unchanged)
            .count();
        stats
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}
