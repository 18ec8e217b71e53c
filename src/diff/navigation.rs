use super::model::{AnnotatedLine, ChangeSummary, Comparison};

/// Where a change lives in each annotated sequence (indexes, not line numbers)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineLocation {
    pub old_index: Option<usize>,
    pub new_index: Option<usize>,
}

impl LineLocation {
    pub fn is_empty(&self) -> bool {
        self.old_index.is_none() && self.new_index.is_none()
    }
}

impl Comparison {
    /// Find the lines a change refers to, keyed by its old/new line numbers.
    pub fn locate(&self, change: &ChangeSummary) -> LineLocation {
        LineLocation {
            old_index: change
                .old_line_number
                .and_then(|number| find_by_number(&self.old_lines, number, |l| l.old_line_number)),
            new_index: change
                .new_line_number
                .and_then(|number| find_by_number(&self.new_lines, number, |l| l.new_line_number)),
        }
    }

    /// Index of the first change at or after `from` (wrapping), used by next-change navigation
    pub fn next_change_index(&self, from: Option<usize>) -> Option<usize> {
        if self.changes.is_empty() {
            return None;
        }
        Some(match from {
            Some(current) => (current + 1) % self.changes.len(),
            None => 0,
        })
    }

    /// Index of the change before `from` (wrapping)
    pub fn previous_change_index(&self, from: Option<usize>) -> Option<usize> {
        if self.changes.is_empty() {
            return None;
        }
        let last = self.changes.len() - 1;
        Some(match from {
            Some(0) | None => last,
            Some(current) => current - 1,
        })
    }
}

// Sequences are sorted by their own side's number, so a binary search suffices.
fn find_by_number(
    lines: &[AnnotatedLine],
    number: usize,
    key: impl Fn(&AnnotatedLine) -> Option<usize>,
) -> Option<usize> {
    lines
        .binary_search_by_key(&Some(number), |line| key(line))
        .ok()
}

#[cfg(test)]
mod tests {
    use crate::diff::classify;
    use crate::diff::model::ChangeKind;

    #[test]
    fn every_change_resolves_to_matching_lines() {
        let comparison = classify(
            "intro\nold one\nold two\nshared\ntail\n",
            "intro\nnew one\nshared\nadded\ntail\n",
        );
        assert!(!comparison.changes.is_empty());

        for change in &comparison.changes {
            let location = comparison.locate(change);
            assert!(!location.is_empty());

            if let Some(index) = location.old_index {
                assert_eq!(comparison.old_lines[index].old_line_number, change.old_line_number);
            }
            if let Some(index) = location.new_index {
                assert_eq!(comparison.new_lines[index].new_line_number, change.new_line_number);
            }
        }
    }

    #[test]
    fn removal_resolves_only_on_old_side() {
        let comparison = classify("a\nb\nc", "a\nc");
        let change = &comparison.changes[0];
        assert_eq!(change.kind, ChangeKind::Removed);

        let location = comparison.locate(change);
        assert_eq!(location.old_index, Some(1));
        assert_eq!(location.new_index, None);
    }

    #[test]
    fn change_cycling_wraps() {
        let comparison = classify("a\nb\nc", "x\nb\ny");
        assert_eq!(comparison.changes.len(), 2);

        assert_eq!(comparison.next_change_index(None), Some(0));
        assert_eq!(comparison.next_change_index(Some(1)), Some(0));
        assert_eq!(comparison.previous_change_index(Some(0)), Some(1));
        assert_eq!(comparison.previous_change_index(Some(1)), Some(0));

        let identical = classify("same", "same");
        assert_eq!(identical.next_change_index(None), None);
    }
}
