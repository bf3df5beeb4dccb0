use std::collections::HashSet;

use crate::{Identifier, Record};

/// Session-scoped set of identifiers already accepted.
///
/// Lives exactly as long as one session; it is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupTracker {
    seen: HashSet<Identifier>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the records whose identifier was not seen before, first occurrence wins.
    /// Repeats inside `records` itself are dropped as well.
    pub fn admit(&mut self, records: Vec<Record>) -> Vec<Record> {
        let mut accepted = Vec::with_capacity(records.len());
        for record in records {
            if self.seen.insert(record.identifier()) {
                accepted.push(record);
            }
        }
        accepted
    }
}
