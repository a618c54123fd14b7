//! Product-identifier deduplication
//!
//! Two checkpoints share this state: before scheduling a detail fetch for a
//! discovered card (an optimization to avoid redundant fetches), and before
//! emitting a record from a parsed detail page (authoritative for the crawl
//! stage). Scheduling and parsing are temporally decoupled, hence two sets.
//!
//! Scoped to one query's run; cross-run duplicates are handled by the
//! persistence layer's insert-or-ignore semantics.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Deduplicator {
    scheduled: HashSet<String>,
    emitted: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint (a): claims an identifier for a detail fetch
    ///
    /// Returns false if a fetch for this identifier was already scheduled.
    pub fn try_schedule(&mut self, product_id: &str) -> bool {
        self.scheduled.insert(product_id.to_string())
    }

    /// Checkpoint (b): claims an identifier for emission
    ///
    /// Returns false if a record with this identifier was already emitted.
    pub fn try_emit(&mut self, product_id: &str) -> bool {
        self.emitted.insert(product_id.to_string())
    }

    /// Number of identifiers emitted so far
    pub fn emitted_count(&self) -> usize {
        self.emitted.len()
    }
}
