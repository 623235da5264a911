//! Fallback platform implementation for non-Linux systems.
//!
//! One mutex-guarded state block plays all three roles: the notifier counter,
//! the armed expiry, and the readiness wait, with a condition variable waking
//! the waiter whenever either changes.

use super::{MIN_ARM_DELAY, Readiness};
use crate::error::TimerResult;
use deadline_core::Deadline;
use parking_lot::{Condvar, Mutex};
use std::io;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Every primitive `init()` needs, created together.
#[derive(Debug)]
pub struct Primitives {
    /// Cross-thread wake counter.
    pub notifier: Notifier,
    /// Programmable one-shot timer.
    pub timer: OsTimer,
    /// Readiness wait over the notifier and the timer.
    pub multiplexer: Multiplexer,
}

/// Create the notifier, the OS timer and the multiplexer sharing one state block.
///
/// # Errors
///
/// Infallible on this platform; the signature matches the Linux variant.
pub fn open(max_events: usize) -> TimerResult<Primitives> {
    let hub = Arc::new(Hub::default());
    Ok(Primitives {
        notifier: Notifier {
            hub: Arc::clone(&hub),
        },
        timer: OsTimer {
            hub: Arc::clone(&hub),
        },
        multiplexer: Multiplexer { hub, max_events },
    })
}

/// Monotonic time since the first reading in this process.
///
/// # Errors
///
/// Infallible on this platform; the signature matches the Linux variant.
pub fn monotonic_now() -> io::Result<Deadline> {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = *ORIGIN.get_or_init(Instant::now);
    // Offset by one second so no reading equals the unset deadline.
    Ok(Deadline::from_duration(
        origin.elapsed() + Duration::from_secs(1),
    ))
}

#[derive(Debug)]
struct Arm {
    next: Instant,
    interval: Option<Duration>,
}

#[derive(Debug, Default)]
struct HubState {
    counter: u64,
    timer: Option<Arm>,
    expirations: u64,
}

impl HubState {
    /// Convert an elapsed arm into counted expirations.
    fn poll_timer(&mut self, now: Instant) {
        let Some(arm) = self.timer.as_mut() else {
            return;
        };
        if now < arm.next {
            return;
        }
        match arm.interval {
            Some(interval) => {
                while arm.next <= now {
                    arm.next += interval;
                    self.expirations = self.expirations.saturating_add(1);
                }
            }
            None => {
                self.expirations = self.expirations.saturating_add(1);
                self.timer = None;
            }
        }
    }
}

#[derive(Debug, Default)]
struct Hub {
    state: Mutex<HubState>,
    changed: Condvar,
}

/// Counter-based wake signal.
#[derive(Debug)]
pub struct Notifier {
    hub: Arc<Hub>,
}

impl Notifier {
    /// Add `value` to the counter, waking the multiplexer.
    ///
    /// # Errors
    ///
    /// Infallible on this platform.
    pub fn signal(&self, value: u64) -> io::Result<()> {
        let mut state = self.hub.state.lock();
        state.counter = state.counter.saturating_add(value);
        self.hub.changed.notify_all();
        Ok(())
    }

    /// Take the accumulated value, leaving zero behind.
    ///
    /// # Errors
    ///
    /// Infallible on this platform.
    pub fn take(&self) -> io::Result<u64> {
        Ok(std::mem::take(&mut self.hub.state.lock().counter))
    }
}

/// Deadline held in the shared state and checked by the waiter.
#[derive(Debug)]
pub struct OsTimer {
    hub: Arc<Hub>,
}

impl OsTimer {
    /// Arm a relative expiry, optionally repeating every `interval` afterwards.
    ///
    /// # Errors
    ///
    /// Infallible on this platform.
    pub fn arm(&self, delay: Duration, interval: Option<Duration>) -> io::Result<()> {
        let mut state = self.hub.state.lock();
        state.timer = Some(Arm {
            next: Instant::now() + delay.max(MIN_ARM_DELAY),
            interval,
        });
        state.expirations = 0;
        self.hub.changed.notify_all();
        Ok(())
    }

    /// Stop the timer; no further expirations are reported.
    ///
    /// # Errors
    ///
    /// Infallible on this platform.
    pub fn disarm(&self) -> io::Result<()> {
        let mut state = self.hub.state.lock();
        state.timer = None;
        state.expirations = 0;
        Ok(())
    }

    /// Take the number of expirations since the last call.
    ///
    /// # Errors
    ///
    /// Infallible on this platform.
    pub fn take_expirations(&self) -> io::Result<u64> {
        let mut state = self.hub.state.lock();
        state.poll_timer(Instant::now());
        Ok(std::mem::take(&mut state.expirations))
    }
}

/// Condition-variable wait over the shared state.
#[derive(Debug)]
pub struct Multiplexer {
    hub: Arc<Hub>,
    max_events: usize,
}

impl Multiplexer {
    /// Block until the counter is non-zero or the timer has expired.
    ///
    /// # Errors
    ///
    /// Infallible on this platform.
    pub fn wait(&mut self) -> io::Result<Readiness> {
        let mut state = self.hub.state.lock();
        loop {
            state.poll_timer(Instant::now());
            let readiness = Readiness {
                notifier: state.counter > 0,
                timer: state.expirations > 0,
            };
            if readiness.notifier || readiness.timer {
                return Ok(readiness);
            }
            match state.timer.as_ref().map(|arm| arm.next) {
                Some(next) => {
                    self.hub.changed.wait_until(&mut state, next);
                }
                None => self.hub.changed.wait(&mut state),
            }
        }
    }

    /// Batch size requested at creation; the condvar wait reports both sources at once.
    #[must_use]
    pub fn max_events(&self) -> usize {
        self.max_events
    }
}
