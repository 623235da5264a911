//! The loop thread body.
//!
//! The loop owns the deadline heap outright; nothing else touches it. Each
//! wake handles the notifier first (shutdown or drain) and then the OS timer
//! (fire at most one due task, then rearm).

use crate::error::{TimerError, TimerResult};
use crate::platform::{self, MIN_ARM_DELAY, Multiplexer, OsTimer};
use crate::stats::TimerStats;
use crate::submission::{SHUTDOWN_SIGNAL, Submitter};
use deadline_core::{Deadline, DeadlineHeap, TaskPool, TimerTask};
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

pub(crate) struct EventLoop {
    heap: DeadlineHeap,
    timer: OsTimer,
    multiplexer: Multiplexer,
    submitter: Arc<Submitter>,
    pool: Arc<TaskPool>,
    stats: Arc<TimerStats>,
    fallback_interval: Option<Duration>,
    isolate_panics: bool,
}

impl EventLoop {
    pub(crate) fn new(
        timer: OsTimer,
        multiplexer: Multiplexer,
        submitter: Arc<Submitter>,
        pool: Arc<TaskPool>,
        stats: Arc<TimerStats>,
        fallback_interval: Option<Duration>,
        isolate_panics: bool,
    ) -> Self {
        Self {
            heap: DeadlineHeap::new(),
            timer,
            multiplexer,
            submitter,
            pool,
            stats,
            fallback_interval,
            isolate_panics,
        }
    }

    /// Run until the shutdown signal is observed or a primitive fails.
    pub(crate) fn run(mut self) -> TimerResult<()> {
        info!(
            fallback_interval = ?self.fallback_interval,
            isolate_panics = self.isolate_panics,
            "Timer loop started"
        );

        let result = self.run_until_shutdown();
        match &result {
            Ok(()) => info!(pending = self.heap.len(), "Timer loop stopped"),
            Err(e) => error!(error = %e, "Timer loop terminated"),
        }
        self.heap.clear();
        result
    }

    fn run_until_shutdown(&mut self) -> TimerResult<()> {
        loop {
            let readiness = match self.multiplexer.wait() {
                Ok(readiness) => readiness,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TimerError::Wait(e)),
            };
            self.stats.inc_wake();

            if readiness.notifier {
                let value = self
                    .submitter
                    .notifier()
                    .take()
                    .map_err(TimerError::Signal)?;
                if value >= SHUTDOWN_SIGNAL {
                    return Ok(());
                }
                if value > 0 {
                    self.drain_submissions()?;
                }
            }

            if readiness.timer {
                let expirations = self.timer.take_expirations().map_err(TimerError::Arm)?;
                if expirations > 0 {
                    self.fire_earliest()?;
                }
            }
        }
    }

    /// Move every queued task into the heap, rearming once at the end if the
    /// minimum moved earlier.
    fn drain_submissions(&mut self) -> TimerResult<()> {
        let mut drained = 0usize;
        let mut new_minimum = false;
        while let Some(task) = self.submitter.pop() {
            new_minimum |= self.heap.push(task);
            drained += 1;
        }

        debug!(
            drained,
            new_minimum,
            pending = self.heap.len(),
            "Drained submission queue"
        );

        match self.heap.earliest_deadline() {
            Some(deadline) if new_minimum => self.rearm(deadline),
            _ => Ok(()),
        }
    }

    /// Fire the earliest task if it is due, then point the timer at whatever
    /// is earliest afterwards.
    fn fire_earliest(&mut self) -> TimerResult<()> {
        let now = now()?;
        if let Some(mut task) = self.heap.pop_due(now) {
            let deadline = task.deadline();
            self.stats
                .record_fire(now.saturating_duration_since(deadline));
            trace!(
                %deadline,
                %now,
                recurring = task.is_recurring(),
                "Firing timer task"
            );

            let completed = self.execute(&mut task);
            if completed && task.is_recurring() {
                self.resubmit(task, now)?;
            } else {
                self.pool.recycle(task);
            }
        }

        match self.heap.earliest_deadline() {
            Some(deadline) => self.rearm(deadline),
            None => {
                self.timer.disarm().map_err(TimerError::Arm)?;
                debug!("Deadline heap empty, OS timer disarmed");
                Ok(())
            }
        }
    }

    /// Route a recurring task back through the submission queue, chained off
    /// its previous deadline.
    fn resubmit(&self, mut task: Box<TimerTask>, now: Deadline) -> TimerResult<()> {
        if let Err(e) = task.schedule_from(now) {
            warn!(error = %e, "Recurring task cannot be rescheduled, retiring it");
            self.pool.recycle(task);
            return Ok(());
        }
        self.submitter.enqueue(task)?;
        self.stats.inc_resubmitted();
        Ok(())
    }

    /// Invoke the callback. Returns `false` if it panicked and was isolated.
    fn execute(&self, task: &mut TimerTask) -> bool {
        if !self.isolate_panics {
            task.run();
            return true;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
            Ok(()) => true,
            Err(payload) => {
                self.stats.inc_callback_panic();
                warn!(
                    panic = panic_message(payload.as_ref()),
                    deadline = %task.deadline(),
                    "Timer callback panicked, task retired"
                );
                false
            }
        }
    }

    fn rearm(&self, deadline: Deadline) -> TimerResult<()> {
        let now = now()?;
        let delay = if deadline.is_due(now) {
            MIN_ARM_DELAY
        } else {
            deadline.saturating_duration_since(now)
        };
        self.timer
            .arm(delay, self.fallback_interval)
            .map_err(TimerError::Arm)?;
        self.stats.inc_rearm();
        debug!(%deadline, ?delay, "OS timer rearmed");
        Ok(())
    }
}

fn now() -> TimerResult<Deadline> {
    platform::monotonic_now().map_err(TimerError::TimeSource)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
