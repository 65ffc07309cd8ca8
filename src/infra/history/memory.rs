//! In-memory execution history, most recent first.

use std::collections::VecDeque;

use crate::core::ExecutionRecord;

/// Execution log with an optional bound.
pub struct InMemoryHistory<T> {
    records: VecDeque<ExecutionRecord<T>>,
    max_records: usize,
}

impl<T: Clone> InMemoryHistory<T> {
    /// Create a history keeping at most `max_records` entries (0 = unbounded).
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records.min(1024)),
            max_records,
        }
    }

    /// Prepend a record, evicting the oldest one when full.
    pub fn record(&mut self, record: ExecutionRecord<T>) {
        if self.max_records > 0 && self.records.len() >= self.max_records {
            self.records.pop_back();
        }
        self.records.push_front(record);
    }

    /// Snapshot of stored records, most recent first.
    pub fn records(&self) -> Vec<ExecutionRecord<T>> {
        self.records.iter().cloned().collect()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every stored record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
