//! History Window - Bounded FIFO of delta records
//!
//! The only aggregate state that outlives a tick. Records are kept in
//! arrival order; once the cap is exceeded the oldest ones are dropped.

use std::collections::VecDeque;

use crate::constants::DEFAULT_HISTORY_CAP;
use super::record::DeltaRecord;

#[derive(Debug, Clone)]
pub struct History {
    records: VecDeque<DeltaRecord>,
    cap: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_HISTORY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(cap.min(DEFAULT_HISTORY_CAP)),
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a batch to the tail, then evict from the head down to the cap
    pub fn append<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = DeltaRecord>,
    {
        self.records.extend(records);

        let overflow = self.records.len().saturating_sub(self.cap);
        if overflow > 0 {
            self.records.drain(..overflow);
            log::debug!("History over cap, evicted {} oldest records", overflow);
        }
    }

    /// Owned copy of every record, oldest first
    pub fn snapshot(&self) -> Vec<DeltaRecord> {
        self.records.iter().cloned().collect()
    }

    /// Owned copy of the `n` most recent records, oldest first
    pub fn tail(&self, n: usize) -> Vec<DeltaRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeltaRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
