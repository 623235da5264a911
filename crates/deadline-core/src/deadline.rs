//! Absolute deadlines as normalized `(secs, nanos)` pairs.
//!
//! A [`Deadline`] is a point on the service's monotonic clock. The sub-second
//! component is always kept below one whole second, so the derived ordering
//! (seconds first, then nanoseconds) is the chronological ordering.

use crate::error::{CoreError, CoreResult};
use core::fmt;
use core::time::Duration;

/// Nanoseconds in one whole second.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Absolute point in time on the monotonic clock.
///
/// The all-zero value doubles as the "unset" marker for task timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Deadline {
    secs: u64,
    nanos: u32,
}

impl Deadline {
    /// The unset deadline.
    pub const ZERO: Deadline = Deadline { secs: 0, nanos: 0 };

    /// Create a deadline, carrying excess nanoseconds into whole seconds.
    ///
    /// The seconds component saturates at `u64::MAX`.
    #[must_use]
    pub const fn new(secs: u64, nanos: u32) -> Self {
        let carry = (nanos / NANOS_PER_SEC) as u64;
        Self {
            secs: secs.saturating_add(carry),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    /// Create a deadline from an offset since the clock origin.
    #[must_use]
    pub const fn from_duration(since_origin: Duration) -> Self {
        Self {
            secs: since_origin.as_secs(),
            nanos: since_origin.subsec_nanos(),
        }
    }

    /// Offset of this deadline from the clock origin.
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::new(self.secs, self.nanos)
    }

    /// Whole seconds component.
    #[inline]
    #[must_use]
    pub const fn secs(self) -> u64 {
        self.secs
    }

    /// Sub-second component, always `< NANOS_PER_SEC`.
    #[inline]
    #[must_use]
    pub const fn subsec_nanos(self) -> u32 {
        self.nanos
    }

    /// True for the unset value.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.secs == 0 && self.nanos == 0
    }

    /// Add an interval, normalizing the sub-second carry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DeadlineOverflow`] if the sum is not representable.
    pub fn checked_add(self, interval: Duration) -> CoreResult<Self> {
        self.as_duration()
            .checked_add(interval)
            .map(Self::from_duration)
            .ok_or_else(|| CoreError::deadline_overflow(self, interval))
    }

    /// Subtract an interval, returning `None` if it would precede the origin.
    #[must_use]
    pub fn checked_sub(self, interval: Duration) -> Option<Self> {
        self.as_duration()
            .checked_sub(interval)
            .map(Self::from_duration)
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: Deadline) -> Duration {
        self.as_duration().saturating_sub(earlier.as_duration())
    }

    /// True once `now` has reached this deadline.
    #[inline]
    #[must_use]
    pub fn is_due(self, now: Deadline) -> bool {
        self <= now
    }
}

impl From<Duration> for Deadline {
    fn from(since_origin: Duration) -> Self {
        Self::from_duration(since_origin)
    }
}

impl From<Deadline> for Duration {
    fn from(deadline: Deadline) -> Self {
        deadline.as_duration()
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.secs, self.nanos)
    }
}
