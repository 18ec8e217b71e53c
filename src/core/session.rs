//! Explicitly owned comparison state
//!
//! Holds the two loaded documents and the comparison derived from them. The
//! comparison is rebuilt from scratch by [`ComparisonSession::set_document`]
//! once both sides are present and one of them changed; nothing recomputes
//! implicitly.

use crate::diff::{Comparison, DiffAlgorithmType, DiffGenerator};
use crate::error::SideDiffError;

use super::events::{LoadEvent, LoadedDocument, Side};

pub struct ComparisonSession {
    generator: DiffGenerator,
    algorithm: DiffAlgorithmType,
    old: Option<LoadedDocument>,
    new: Option<LoadedDocument>,
    comparison: Option<Comparison>,
    revision: u64,
}

impl ComparisonSession {
    pub fn new(algorithm: DiffAlgorithmType) -> Self {
        Self {
            generator: DiffGenerator::new(algorithm),
            algorithm,
            old: None,
            new: None,
            comparison: None,
            revision: 0,
        }
    }

    pub fn algorithm(&self) -> DiffAlgorithmType {
        self.algorithm
    }

    pub fn document(&self, side: Side) -> Option<&LoadedDocument> {
        match side {
            Side::Old => self.old.as_ref(),
            Side::New => self.new.as_ref(),
        }
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        self.comparison.as_ref()
    }

    /// Incremented every time the comparison is rebuilt
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_ready(&self) -> bool {
        self.old.is_some() && self.new.is_some()
    }

    /// Install a document for `side`. Returns true when the comparison was rebuilt.
    pub fn set_document(&mut self, side: Side, document: LoadedDocument) -> bool {
        let slot = match side {
            Side::Old => &mut self.old,
            Side::New => &mut self.new,
        };

        let unchanged = slot
            .as_ref()
            .map(|current| current.text == document.text)
            .unwrap_or(false);
        *slot = Some(document);

        if unchanged && self.comparison.is_some() {
            tracing::debug!("{} text unchanged, keeping comparison", side);
            return false;
        }
        self.recompute()
    }

    /// Apply a finished read. Failed reads leave the session untouched and
    /// hand the error back to the caller.
    pub fn apply(&mut self, event: LoadEvent) -> Result<bool, SideDiffError> {
        match event {
            LoadEvent::Loaded { side, document } => {
                tracing::info!("Loaded {} file {}", side, document.path.display());
                Ok(self.set_document(side, document))
            }
            LoadEvent::Failed { error, .. } => Err(error),
        }
    }

    /// Switch the diff algorithm, rebuilding when both texts are present
    pub fn set_algorithm(&mut self, algorithm: DiffAlgorithmType) -> bool {
        if algorithm == self.algorithm {
            return false;
        }
        self.algorithm = algorithm;
        self.generator = DiffGenerator::new(algorithm);
        self.recompute()
    }

    fn recompute(&mut self) -> bool {
        let (Some(old), Some(new)) = (&self.old, &self.new) else {
            return false;
        };

        let comparison = self.generator.compare(&old.text, &new.text);
        tracing::info!(
            "Compared {} with {}: {} changes",
            old.path.display(),
            new.path.display(),
            comparison.changes.len()
        );
        self.comparison = Some(comparison);
        self.revision += 1;
        true
    }
}

impl Default for ComparisonSession {
    fn default() -> Self {
        Self::new(DiffAlgorithmType::default())
    }
}
