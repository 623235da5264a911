//! Cross-thread submission path.
//!
//! Producers push scheduled tasks onto a lock-guarded queue and bump the
//! notifier; the loop thread drains the queue into its heap. The queue lock is
//! held only for a single push or pop.

use crate::error::{TimerError, TimerResult};
use crate::platform::Notifier;
use crate::stats::TimerStats;
use deadline_core::{Deadline, TimerTask};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Notifier value announcing queued work.
pub(crate) const WORK_AVAILABLE: u64 = 1;

/// Notifier threshold at or above which the accumulated value means shutdown.
pub(crate) const SHUTDOWN_SIGNAL: u64 = 1 << 48;

#[derive(Debug)]
pub(crate) struct Submitter {
    queue: Mutex<VecDeque<Box<TimerTask>>>,
    notifier: Notifier,
    stats: Arc<TimerStats>,
}

impl Submitter {
    pub(crate) fn new(notifier: Notifier, stats: Arc<TimerStats>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notifier,
            stats,
        }
    }

    /// Compute the task's next deadline from `now` and enqueue it.
    ///
    /// The task is dropped if its deadline overflows.
    pub(crate) fn submit(&self, mut task: Box<TimerTask>, now: Deadline) -> TimerResult<()> {
        task.schedule_from(now)?;
        self.enqueue(task)
    }

    /// Enqueue an already scheduled task and wake the loop.
    pub(crate) fn enqueue(&self, task: Box<TimerTask>) -> TimerResult<()> {
        self.queue.lock().push_back(task);
        self.stats.inc_submitted();
        self.notifier
            .signal(WORK_AVAILABLE)
            .map_err(TimerError::Signal)
    }

    pub(crate) fn pop(&self) -> Option<Box<TimerTask>> {
        self.queue.lock().pop_front()
    }

    pub(crate) fn signal_shutdown(&self) -> TimerResult<()> {
        self.notifier
            .signal(SHUTDOWN_SIGNAL)
            .map_err(TimerError::Signal)
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
