//! Linux platform implementation on eventfd, timerfd and epoll.

#![expect(
    unsafe_code,
    reason = "eventfd, timerfd and epoll are only reachable through raw libc calls"
)]

use super::{MIN_ARM_DELAY, Readiness};
use crate::error::{TimerError, TimerResult};
use deadline_core::Deadline;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

const NOTIFIER_TOKEN: u64 = 1;
const TIMER_TOKEN: u64 = 2;

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

/// Create the notifier, the OS timer and the multiplexer registered on both.
///
/// # Errors
///
/// Returns [`TimerError::Init`] naming the primitive that could not be created.
pub fn open(max_events: usize) -> TimerResult<Primitives> {
    let notifier = Notifier::open().map_err(|source| TimerError::init("eventfd", source))?;
    let timer = OsTimer::open().map_err(|source| TimerError::init("timerfd", source))?;
    let multiplexer = Multiplexer::open(&notifier, &timer, max_events)
        .map_err(|source| TimerError::init("epoll", source))?;
    Ok(Primitives {
        notifier,
        timer,
        multiplexer,
    })
}

/// Read `CLOCK_MONOTONIC`.
///
/// # Errors
///
/// Returns the OS error if the clock cannot be read.
pub fn monotonic_now() -> io::Result<Deadline> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    cvt(unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &raw mut ts) })?;
    let secs = u64::try_from(ts.tv_sec).map_err(io::Error::other)?;
    let nanos = u32::try_from(ts.tv_nsec).map_err(io::Error::other)?;
    Ok(Deadline::new(secs, nanos))
}

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

fn adopt(fd: RawFd) -> File {
    // SAFETY: `fd` was just returned by a successful syscall and has no other owner.
    File::from(unsafe { OwnedFd::from_raw_fd(fd) })
}

fn to_timespec(duration: Duration) -> libc::timespec {
    libc::timespec {
        tv_sec: libc::time_t::try_from(duration.as_secs()).unwrap_or(libc::time_t::MAX),
        tv_nsec: libc::c_long::try_from(duration.subsec_nanos()).unwrap_or(0),
    }
}

/// Read and reset an 8-byte kernel counter; an empty counter reads as zero.
fn take_counter(file: &File) -> io::Result<u64> {
    let mut reader = file;
    let mut buf = [0u8; 8];
    loop {
        match reader.read(&mut buf) {
            Ok(8) => return Ok(u64::from_ne_bytes(buf)),
            Ok(n) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("short counter read: {n} bytes"),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(0),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// eventfd-backed wake counter.
///
/// Signals add to the counter; a read returns the accumulated sum and resets
/// it, so any number of signals between two reads coalesce into one wake.
#[derive(Debug)]
pub struct Notifier {
    fd: File,
}

impl Notifier {
    fn open() -> io::Result<Self> {
        // SAFETY: eventfd takes no pointers.
        let fd = cvt(unsafe { libc::eventfd(0, libc::EFD_NONBLOCK | libc::EFD_CLOEXEC) })?;
        Ok(Self { fd: adopt(fd) })
    }

    /// Add `value` to the counter, waking the multiplexer.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the write fails (including counter overflow).
    pub fn signal(&self, value: u64) -> io::Result<()> {
        let mut writer = &self.fd;
        writer.write_all(&value.to_ne_bytes())
    }

    /// Take the accumulated value, leaving zero behind.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the read fails.
    pub fn take(&self) -> io::Result<u64> {
        take_counter(&self.fd)
    }
}

/// timerfd-backed OS timer on `CLOCK_MONOTONIC`.
#[derive(Debug)]
pub struct OsTimer {
    fd: File,
}

impl OsTimer {
    fn open() -> io::Result<Self> {
        // SAFETY: timerfd_create takes no pointers.
        let fd = cvt(unsafe {
            libc::timerfd_create(libc::CLOCK_MONOTONIC, libc::TFD_NONBLOCK | libc::TFD_CLOEXEC)
        })?;
        Ok(Self { fd: adopt(fd) })
    }

    /// Arm a relative expiry, optionally repeating every `interval` afterwards.
    ///
    /// A zero delay is raised to [`MIN_ARM_DELAY`].
    ///
    /// # Errors
    ///
    /// Returns the OS error if `timerfd_settime` fails.
    pub fn arm(&self, delay: Duration, interval: Option<Duration>) -> io::Result<()> {
        self.set_time(delay.max(MIN_ARM_DELAY), interval.unwrap_or(Duration::ZERO))
    }

    /// Stop the timer; no further expirations are reported.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `timerfd_settime` fails.
    pub fn disarm(&self) -> io::Result<()> {
        self.set_time(Duration::ZERO, Duration::ZERO)
    }

    /// Take the number of expirations since the last call.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the read fails.
    pub fn take_expirations(&self) -> io::Result<u64> {
        take_counter(&self.fd)
    }

    fn set_time(&self, value: Duration, interval: Duration) -> io::Result<()> {
        let spec = libc::itimerspec {
            it_interval: to_timespec(interval),
            it_value: to_timespec(value),
        };
        // SAFETY: `spec` outlives the call and a null old-value pointer is permitted.
        cvt(unsafe {
            libc::timerfd_settime(self.fd.as_raw_fd(), 0, &raw const spec, std::ptr::null_mut())
        })?;
        Ok(())
    }
}

/// epoll instance watching the notifier and the OS timer.
pub struct Multiplexer {
    epoll: File,
    events: Vec<libc::epoll_event>,
}

impl Multiplexer {
    fn open(notifier: &Notifier, timer: &OsTimer, max_events: usize) -> io::Result<Self> {
        // SAFETY: epoll_create1 takes no pointers.
        let fd = cvt(unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) })?;
        let multiplexer = Self {
            epoll: adopt(fd),
            events: vec![libc::epoll_event { events: 0, u64: 0 }; max_events.max(1)],
        };
        multiplexer.register(notifier.fd.as_raw_fd(), NOTIFIER_TOKEN)?;
        multiplexer.register(timer.fd.as_raw_fd(), TIMER_TOKEN)?;
        Ok(multiplexer)
    }

    fn register(&self, fd: RawFd, token: u64) -> io::Result<()> {
        let mut event = libc::epoll_event {
            events: libc::EPOLLIN.unsigned_abs(),
            u64: token,
        };
        // SAFETY: `event` is valid for the call and both descriptors are open.
        cvt(unsafe {
            libc::epoll_ctl(
                self.epoll.as_raw_fd(),
                libc::EPOLL_CTL_ADD,
                fd,
                &raw mut event,
            )
        })?;
        Ok(())
    }

    /// Block until at least one source is ready. No timeout.
    ///
    /// # Errors
    ///
    /// Returns the OS error; `ErrorKind::Interrupted` signals a benign
    /// interruption the caller should retry.
    pub fn wait(&mut self) -> io::Result<Readiness> {
        let capacity = libc::c_int::try_from(self.events.len()).unwrap_or(libc::c_int::MAX);
        // SAFETY: the buffer holds `capacity` events and outlives the call.
        let count = cvt(unsafe {
            libc::epoll_wait(
                self.epoll.as_raw_fd(),
                self.events.as_mut_ptr(),
                capacity,
                -1,
            )
        })?;

        let mut readiness = Readiness::default();
        for event in self.events.iter().take(usize::try_from(count).unwrap_or(0)) {
            let token = event.u64;
            match token {
                NOTIFIER_TOKEN => readiness.notifier = true,
                TIMER_TOKEN => readiness.timer = true,
                _ => {}
            }
        }
        Ok(readiness)
    }
}

impl std::fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multiplexer")
            .field("epoll", &self.epoll.as_raw_fd())
            .field("max_events", &self.events.len())
            .finish()
    }
}
