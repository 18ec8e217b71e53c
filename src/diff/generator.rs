use super::algorithms::{DiffAlgorithm, DiffAlgorithmType};
use super::classifier::classify_segments;
use super::model::{Comparison, Segment};

/// High-level comparison driver that can use different line-diff algorithms
pub struct DiffGenerator {
    algorithm: Box<dyn DiffAlgorithm>,
}

impl DiffGenerator {
    /// Create a new generator with the specified algorithm
    pub fn new(algorithm_type: DiffAlgorithmType) -> Self {
        Self {
            algorithm: algorithm_type.create(),
        }
    }

    /// Raw segment sequence between old and new content
    pub fn segments(&self, old: &str, new: &str) -> Vec<Segment> {
        self.algorithm.segments(old, new)
    }

    /// Diff and classify old and new content into a full comparison
    pub fn compare(&self, old: &str, new: &str) -> Comparison {
        let segments = self.segments(old, new);
        tracing::debug!(
            algorithm = self.algorithm_name(),
            segments = segments.len(),
            "computed line diff"
        );
        classify_segments(&segments)
    }

    /// Get the current algorithm name
    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }
}

impl Default for DiffGenerator {
    fn default() -> Self {
        Self::new(DiffAlgorithmType::default())
    }
}
