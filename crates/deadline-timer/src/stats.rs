//! Atomic counters describing loop activity.
//!
//! Counters are bumped with `Ordering::Relaxed` from the loop thread and from
//! producers; readers take a [`TimerStatsSnapshot`] which is eventually
//! consistent across fields.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lateness beyond which a firing counts as late.
pub const LATE_FIRE_THRESHOLD: Duration = Duration::from_millis(1);

/// Counter snapshot returned by [`TimerStats::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerStatsSnapshot {
    /// Tasks accepted by `add_timer_task`, including recurring resubmissions
    pub tasks_submitted: u64,
    /// Callbacks invoked
    pub tasks_fired: u64,
    /// Recurring tasks routed back through the submission queue
    pub tasks_resubmitted: u64,
    /// Callbacks that panicked and were isolated
    pub callback_panics: u64,
    /// OS timer rearms
    pub timer_rearms: u64,
    /// Multiplexer wakes
    pub loop_wakes: u64,
    /// Firings later than [`LATE_FIRE_THRESHOLD`] after their deadline
    pub late_fires: u64,
    /// Worst observed lateness in nanoseconds
    pub max_lateness_ns: u64,
}

/// Shared atomic counters for one controller.
#[derive(Debug, Default)]
pub struct TimerStats {
    tasks_submitted: AtomicU64,
    tasks_fired: AtomicU64,
    tasks_resubmitted: AtomicU64,
    callback_panics: AtomicU64,
    timer_rearms: AtomicU64,
    loop_wakes: AtomicU64,
    late_fires: AtomicU64,
    max_lateness_ns: AtomicU64,
}

impl TimerStats {
    /// Create zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_fired: AtomicU64::new(0),
            tasks_resubmitted: AtomicU64::new(0),
            callback_panics: AtomicU64::new(0),
            timer_rearms: AtomicU64::new(0),
            loop_wakes: AtomicU64::new(0),
            late_fires: AtomicU64::new(0),
            max_lateness_ns: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn inc_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a firing and how late it ran relative to its deadline.
    #[inline]
    pub(crate) fn record_fire(&self, lateness: Duration) {
        self.tasks_fired.fetch_add(1, Ordering::Relaxed);
        if lateness > LATE_FIRE_THRESHOLD {
            self.late_fires.fetch_add(1, Ordering::Relaxed);
        }
        let lateness_ns = u64::try_from(lateness.as_nanos()).unwrap_or(u64::MAX);
        self.max_lateness_ns.fetch_max(lateness_ns, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_resubmitted(&self) {
        self.tasks_resubmitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_callback_panic(&self) {
        self.callback_panics.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_rearm(&self) {
        self.timer_rearms.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_wake(&self) {
        self.loop_wakes.fetch_add(1, Ordering::Relaxed);
    }

    /// Tasks fired so far.
    #[must_use]
    pub fn tasks_fired(&self) -> u64 {
        self.tasks_fired.load(Ordering::Relaxed)
    }

    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> TimerStatsSnapshot {
        TimerStatsSnapshot {
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_fired: self.tasks_fired.load(Ordering::Relaxed),
            tasks_resubmitted: self.tasks_resubmitted.load(Ordering::Relaxed),
            callback_panics: self.callback_panics.load(Ordering::Relaxed),
            timer_rearms: self.timer_rearms.load(Ordering::Relaxed),
            loop_wakes: self.loop_wakes.load(Ordering::Relaxed),
            late_fires: self.late_fires.load(Ordering::Relaxed),
            max_lateness_ns: self.max_lateness_ns.load(Ordering::Relaxed),
        }
    }
}
