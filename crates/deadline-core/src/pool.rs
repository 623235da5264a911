//! Free-list of reusable timer tasks.
//!
//! One-shot tasks are returned here after they fire. Recycling resets every
//! mutable field first, so an acquired task never carries a callback,
//! timestamp or recurrence flag from its previous run.
//!
//! The free-list sits behind its own lock: the loop thread recycles into it,
//! while producer threads may acquire from it concurrently.

use crate::task::TimerTask;
use parking_lot::Mutex;

/// Default upper bound on retained tasks.
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Bounded pool of reusable [`TimerTask`] allocations.
#[derive(Debug)]
pub struct TaskPool {
    free: Mutex<Vec<Box<TimerTask>>>,
    capacity: usize,
}

impl TaskPool {
    /// Create a pool retaining at most `capacity` tasks.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity.min(DEFAULT_POOL_CAPACITY))),
            capacity,
        }
    }

    /// Take a recycled task, or allocate an empty one if the pool is dry.
    #[must_use]
    pub fn acquire(&self) -> Box<TimerTask> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| Box::new(TimerTask::empty()))
    }

    /// Reset a task and keep it for reuse.
    ///
    /// Returns `false` when the pool is full and the task was dropped instead.
    pub fn recycle(&self, mut task: Box<TimerTask>) -> bool {
        task.reset();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(task);
            true
        } else {
            false
        }
    }

    /// Number of tasks currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.free.lock().len()
    }

    /// Whether the free-list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.lock().is_empty()
    }

    /// Maximum number of retained tasks.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}
