//! Cheap rejection of unusable identifier batches, before any I/O

use crate::error::EnrichmentError;

use super::Identifier;

/// A batch of identifiers known to be non-empty.
///
/// Individual identifiers are not inspected here: a malformed one simply
/// fails to resolve and is reported as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelBatch(Vec<Identifier>);

impl ParcelBatch {
    pub fn new(ids: Vec<Identifier>) -> Result<Self, EnrichmentError> {
        if ids.is_empty() {
            return Err(EnrichmentError::EmptyBatch);
        }
        Ok(Self(ids))
    }

    pub fn ids(&self) -> &[Identifier] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identifiers in first-seen order, duplicates dropped
    pub fn unique_ids(&self) -> Vec<Identifier> {
        let mut seen = std::collections::HashSet::new();
        self.0
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }
}
