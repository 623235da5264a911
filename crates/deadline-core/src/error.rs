//! Error types for the task model.

use crate::deadline::Deadline;
use core::time::Duration;
use thiserror::Error;

/// Errors raised while computing task deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Adding the interval to the base time does not fit in a [`Deadline`].
    #[error("Deadline overflow: {base} + {interval:?} is not representable")]
    DeadlineOverflow {
        /// Base time the interval was added to.
        base: Deadline,
        /// Interval that caused the overflow.
        interval: Duration,
    },

    /// A recurring task was scheduled with a zero interval.
    ///
    /// Every resubmission would land on the same deadline and keep the task
    /// permanently earliest.
    #[error("Recurring task interval must be greater than 0")]
    ZeroRecurringInterval,
}

impl CoreError {
    /// Create a deadline overflow error.
    #[must_use]
    pub fn deadline_overflow(base: Deadline, interval: Duration) -> Self {
        Self::DeadlineOverflow { base, interval }
    }
}

/// A specialized `Result` type for task-model operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
