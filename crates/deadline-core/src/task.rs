//! Schedulable timer tasks.
//!
//! A [`TimerTask`] carries a callback, an interval and a recurrence flag. Its
//! deadline is computed when it is submitted: a fresh task is stamped with the
//! submission time as its create time, while a task that already has a
//! deadline chains its next deadline off that prior deadline. Chaining keeps
//! recurring tasks on their original cadence no matter how late each firing
//! actually ran.

use crate::deadline::Deadline;
use crate::error::{CoreError, CoreResult};
use core::fmt;
use core::time::Duration;

/// Zero-argument action invoked when a task fires.
pub type Callback = Box<dyn FnMut() + Send + 'static>;

/// A one-shot or recurring unit of scheduled work.
pub struct TimerTask {
    callback: Option<Callback>,
    interval: Duration,
    recurring: bool,
    create_time: Deadline,
    deadline: Deadline,
}

impl TimerTask {
    /// Create a task with no callback and all fields unset.
    ///
    /// This is the state the task pool hands out.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            callback: None,
            interval: Duration::ZERO,
            recurring: false,
            create_time: Deadline::ZERO,
            deadline: Deadline::ZERO,
        }
    }

    /// Create a task that fires once, `interval` after submission.
    #[must_use]
    pub fn once<F>(interval: Duration, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::empty().with_interval(interval).with_callback(callback)
    }

    /// Create a task that fires every `interval`, starting one interval after submission.
    ///
    /// The interval must be non-zero: scheduling a recurring task with a zero
    /// interval fails with [`crate::CoreError::ZeroRecurringInterval`].
    #[must_use]
    pub fn recurring<F>(interval: Duration, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::once(interval, callback).with_recurring(true)
    }

    /// Set the callback.
    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.set_callback(callback);
        self
    }

    /// Set the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the recurrence flag.
    #[must_use]
    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Pin the create time instead of stamping it at submission.
    ///
    /// The first deadline becomes `create_time + interval`. Several tasks
    /// sharing one anchor get exactly spaced deadlines.
    #[must_use]
    pub fn with_create_time(mut self, create_time: Deadline) -> Self {
        self.create_time = create_time;
        self
    }

    /// Replace the callback in place (for tasks acquired from the pool).
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Replace the interval in place.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Replace the recurrence flag in place.
    pub fn set_recurring(&mut self, recurring: bool) {
        self.recurring = recurring;
    }

    /// Compute the next deadline and return it.
    ///
    /// - unset create time: stamp `now` and fire at `now + interval`
    /// - create time set, no deadline yet: fire at `create_time + interval`
    /// - prior deadline present: fire at `prior_deadline + interval`
    ///
    /// # Errors
    ///
    /// - [`CoreError::ZeroRecurringInterval`] for a recurring task with a zero
    ///   interval
    /// - [`CoreError::DeadlineOverflow`] if the sum does not fit
    ///
    /// The task is left unchanged in either case.
    pub fn schedule_from(&mut self, now: Deadline) -> CoreResult<Deadline> {
        if self.recurring && self.interval.is_zero() {
            return Err(CoreError::ZeroRecurringInterval);
        }
        let base = if self.create_time.is_zero() {
            now
        } else if self.deadline.is_zero() {
            self.create_time
        } else {
            self.deadline
        };
        let deadline = base.checked_add(self.interval)?;
        if self.create_time.is_zero() {
            self.create_time = now;
        }
        self.deadline = deadline;
        Ok(deadline)
    }

    /// Invoke the callback, if any.
    pub fn run(&mut self) {
        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
    }

    /// Clear callback, timestamps, interval and recurrence flag.
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Interval between submission (or prior deadline) and firing.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the task re-submits itself after each firing.
    #[inline]
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.recurring
    }

    /// Time of first submission, or [`Deadline::ZERO`] if never submitted.
    #[inline]
    #[must_use]
    pub fn create_time(&self) -> Deadline {
        self.create_time
    }

    /// Currently scheduled deadline, or [`Deadline::ZERO`] if never scheduled.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Whether a callback is installed.
    #[inline]
    #[must_use]
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl Default for TimerTask {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for TimerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerTask")
            .field("has_callback", &self.has_callback())
            .field("interval", &self.interval)
            .field("recurring", &self.recurring)
            .field("create_time", &self.create_time)
            .field("deadline", &self.deadline)
            .finish()
    }
}
