//! Shared bounded event log.
//!
//! Collaborators are handed to the control loop as trait objects, so the
//! records they keep are exposed through a cloneable handle instead of
//! through the collaborator itself. The log keeps the most recent
//! `capacity` entries; older ones are dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default number of retained entries.
pub const RECORDER_CAPACITY: usize = 4096;

/// Cloneable handle to a shared event ring.
#[derive(Debug)]
pub struct Recorder<T> {
    entries: Arc<Mutex<VecDeque<T>>>,
    capacity: usize,
}

impl<T> Recorder<T> {
    pub fn new() -> Self {
        Self::with_capacity(RECORDER_CAPACITY)
    }

    /// Log retaining at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    // A panicking writer cannot leave a half-pushed entry behind.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, entry: T) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T: Clone> Recorder<T> {
    /// Copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }

    pub fn last(&self) -> Option<T> {
        self.lock().back().cloned()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            capacity: self.capacity,
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
