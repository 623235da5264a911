//! OS primitives behind the timer service.
//!
//! - **Linux**: `eventfd` notifier, `timerfd` OS timer, `epoll` multiplexer,
//!   `CLOCK_MONOTONIC` time source
//! - **Other platforms**: one mutex and condition variable standing in for all three
//!
//! Both variants expose the same surface: [`monotonic_now`], [`open`],
//! [`Notifier`], [`OsTimer`] and [`Multiplexer`].

use std::time::Duration;

/// Smallest positive delay the OS timer is ever armed with.
///
/// Arming with zero would disarm the timer instead of firing it.
pub const MIN_ARM_DELAY: Duration = Duration::from_nanos(1);

/// Which registered sources a multiplexer wait reported as ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// The notifier counter is non-zero.
    pub notifier: bool,
    /// The OS timer has expired at least once.
    pub timer: bool,
}

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub use linux::{Multiplexer, Notifier, OsTimer, Primitives, monotonic_now, open};

#[cfg(any(test, not(target_os = "linux")))]
mod fallback;

#[cfg(not(target_os = "linux"))]
pub use fallback::{Multiplexer, Notifier, OsTimer, Primitives, monotonic_now, open};
