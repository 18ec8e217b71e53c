//! Diff generation and classification module
//!
//! A trait-based line-diff primitive produces segments, the classifier turns
//! them into two annotated documents plus a change list, and the formatter
//! renders the result for non-interactive output.

pub mod algorithms;
pub mod classifier;
pub mod formatter;
pub mod generator;
pub mod model;
pub mod navigation;

// Re-export the main types for easier use
pub use algorithms::{
    split_lines, DiffAlgorithm, DiffAlgorithmType, LcsAlgorithm, MyersAlgorithm, PatienceAlgorithm,
};
pub use classifier::{classify, classify_segments};
pub use formatter::{align_rows, DiffFormat, DiffFormatter};
pub use generator::DiffGenerator;
pub use model::{
    AnnotatedLine, ChangeKind, ChangeSummary, Comparison, ComparisonStats, LineKind, Segment,
    SegmentKind,
};
pub use navigation::LineLocation;
