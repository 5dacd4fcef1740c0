//! Per-item outcomes of concurrent batch writes.
//!
//! Batches are never rolled back: every item is attempted, successes stay
//! written, and failures are collected so callers can show partial results.

use serde::Serialize;

use crate::store::StoreError;
use crate::types::DbId;

/// One item of a batch that failed to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub id: DbId,
    pub error: String,
}

/// Aggregate outcome of a batch of independent writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchSummary {
    /// Fold per-item results, keyed by entity id, into a summary.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (DbId, Result<(), StoreError>)>,
    {
        let mut summary = Self::default();
        for (id, result) in results {
            summary.attempted += 1;
            match result {
                Ok(()) => summary.succeeded += 1,
                Err(err) => summary.failures.push(ItemFailure {
                    id,
                    error: err.to_string(),
                }),
            }
        }
        summary
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
