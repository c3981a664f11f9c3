//! Bounded FIFO history buffer
//!
//! Shared by the polling path (snapshots, relay actions) and the push-mode
//! ingestion server so both evict the same way.

use std::collections::VecDeque;

/// Ring buffer keeping the most recent `capacity` entries in insertion order
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Create a history holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one; a buffer that can never hold
    /// anything is useless.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest once capacity is exceeded
    pub fn push(&mut self, entry: T) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Entries oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries, keeping the capacity
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the contents wholesale (reload path); keeps only the newest
    /// `capacity` entries when given more
    pub fn replace_all(&mut self, entries: Vec<T>) {
        self.entries.clear();
        for entry in entries {
            self.push(entry);
        }
    }
}

impl<T: Clone> History<T> {
    /// Copy out the entries oldest-first
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}
