//! Min-heap of tasks keyed by absolute deadline.
//!
//! Equal deadlines have no defined relative order: two tasks due at the same
//! instant may fire either way round.

use crate::deadline::Deadline;
use crate::task::TimerTask;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry ordered so the earliest deadline sits on top.
#[derive(Debug)]
struct Entry(Box<TimerTask>);

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other.0.deadline().cmp(&self.0.deadline())
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.0.deadline() == other.0.deadline()
    }
}

impl Eq for Entry {}

/// Deadline-ordered task store.
///
/// Owned by exactly one thread; it carries no internal locking.
#[derive(Debug, Default)]
pub struct DeadlineHeap {
    entries: BinaryHeap<Entry>,
}

impl DeadlineHeap {
    /// Create an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BinaryHeap::new(),
        }
    }

    /// Create an empty heap with room for `capacity` tasks.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Insert a scheduled task.
    ///
    /// Returns `true` if the task became the new earliest entry, meaning the
    /// heap was empty or its deadline is strictly earlier than the previous
    /// minimum. Callers use this to decide whether the OS timer needs a rearm.
    pub fn push(&mut self, task: Box<TimerTask>) -> bool {
        let becomes_earliest = self
            .earliest_deadline()
            .is_none_or(|current| task.deadline() < current);
        self.entries.push(Entry(task));
        becomes_earliest
    }

    /// Earliest task without removing it.
    #[must_use]
    pub fn peek_earliest(&self) -> Option<&TimerTask> {
        self.entries.peek().map(|entry| entry.0.as_ref())
    }

    /// Deadline of the earliest task.
    #[must_use]
    pub fn earliest_deadline(&self) -> Option<Deadline> {
        self.entries.peek().map(|entry| entry.0.deadline())
    }

    /// Remove and return the earliest task.
    pub fn pop_earliest(&mut self) -> Option<Box<TimerTask>> {
        self.entries.pop().map(|entry| entry.0)
    }

    /// Remove and return the earliest task only if it is due at `now`.
    pub fn pop_due(&mut self, now: Deadline) -> Option<Box<TimerTask>> {
        if self.earliest_deadline()?.is_due(now) {
            self.pop_earliest()
        } else {
            None
        }
    }

    /// Number of queued tasks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tasks are queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every queued task.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
