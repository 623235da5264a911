//! Controller lifecycle: init, submission, shutdown and join.

use crate::config::TimerConfig;
use crate::error::{TimerError, TimerResult};
use crate::event_loop::EventLoop;
use crate::platform;
use crate::stats::{TimerStats, TimerStatsSnapshot};
use crate::submission::Submitter;
use deadline_core::{TaskPool, TimerTask};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Lifecycle state of a [`TimerController`].
///
/// Transitions only move forward: uninitialized, running, stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControllerState {
    /// `init()` has not succeeded yet.
    Uninitialized = 0,
    /// The loop thread is running and accepting tasks.
    Running = 1,
    /// Shutdown was requested; the controller cannot be restarted.
    Stopped = 2,
}

impl ControllerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// A timer service: one loop thread firing callbacks in deadline order.
///
/// Any thread may submit tasks once [`init`](Self::init) has succeeded. The
/// controller owns the loop thread; dropping a running controller shuts it
/// down and joins it.
pub struct TimerController {
    config: TimerConfig,
    state: AtomicU8,
    init_lock: Mutex<()>,
    submitter: RwLock<Option<Arc<Submitter>>>,
    thread: Mutex<Option<JoinHandle<TimerResult<()>>>>,
    pool: Arc<TaskPool>,
    stats: Arc<TimerStats>,
}

impl TimerController {
    /// Create an uninitialized controller. No OS resources are acquired yet.
    #[must_use]
    pub fn new(config: TimerConfig) -> Self {
        let pool = Arc::new(TaskPool::new(config.pool_capacity));
        Self {
            config,
            state: AtomicU8::new(ControllerState::Uninitialized as u8),
            init_lock: Mutex::new(()),
            submitter: RwLock::new(None),
            thread: Mutex::new(None),
            pool,
            stats: Arc::new(TimerStats::new()),
        }
    }

    /// Create the OS primitives and start the loop thread.
    ///
    /// The first timer expiry is armed `initial_arm_delay` out, before any
    /// task exists. Calling `init` again while running is a no-op.
    ///
    /// # Errors
    ///
    /// - [`TimerError::Stopped`] after shutdown
    /// - [`TimerError::InvalidConfig`] if the configuration fails validation
    /// - [`TimerError::Init`] if a primitive cannot be created or armed
    /// - [`TimerError::ThreadSpawn`] if the loop thread cannot be started
    pub fn init(&self) -> TimerResult<()> {
        let _guard = self.init_lock.lock();
        match self.state() {
            ControllerState::Running => return Ok(()),
            ControllerState::Stopped => return Err(TimerError::Stopped),
            ControllerState::Uninitialized => {}
        }

        self.config.validate()?;
        let primitives = platform::open(self.config.max_events)?;
        primitives
            .timer
            .arm(self.config.initial_arm_delay, self.config.fallback_interval)
            .map_err(|source| TimerError::init("initial timer arm", source))?;

        let submitter = Arc::new(Submitter::new(
            primitives.notifier,
            Arc::clone(&self.stats),
        ));
        let event_loop = EventLoop::new(
            primitives.timer,
            primitives.multiplexer,
            Arc::clone(&submitter),
            Arc::clone(&self.pool),
            Arc::clone(&self.stats),
            self.config.fallback_interval,
            self.config.isolate_panics,
        );

        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || event_loop.run())
            .map_err(TimerError::ThreadSpawn)?;

        *self.submitter.write() = Some(submitter);
        *self.thread.lock() = Some(handle);
        self.state
            .store(ControllerState::Running as u8, Ordering::Release);

        info!(
            thread = %self.config.thread_name,
            initial_arm_delay = ?self.config.initial_arm_delay,
            "Timer controller initialized"
        );
        Ok(())
    }

    /// Schedule a task, computing its deadline from its interval.
    ///
    /// A task with no create-time is scheduled relative to now; a task that
    /// already carries a deadline chains off it.
    ///
    /// # Errors
    ///
    /// - [`TimerError::NotInitialized`] before `init`
    /// - [`TimerError::Stopped`] after shutdown
    /// - [`TimerError::Core`] for a recurring task with a zero interval, or a
    ///   deadline that overflows
    /// - [`TimerError::TimeSource`] or [`TimerError::Signal`] if the clock or
    ///   the wake fails
    pub fn add_timer_task(&self, task: impl Into<Box<TimerTask>>) -> TimerResult<()> {
        let submitter = self.running_submitter()?;
        let now = platform::monotonic_now().map_err(TimerError::TimeSource)?;
        submitter.submit(task.into(), now)
    }

    /// Ask the loop thread to stop.
    ///
    /// No callback fires once the loop observes the request, even if tasks
    /// remain pending. Calling `shutdown` on a stopped controller is a no-op.
    ///
    /// # Errors
    ///
    /// [`TimerError::NotInitialized`] before `init`, or
    /// [`TimerError::Signal`] if the notifier write fails.
    pub fn shutdown(&self) -> TimerResult<()> {
        let _guard = self.init_lock.lock();
        match self.state() {
            ControllerState::Uninitialized => return Err(TimerError::NotInitialized),
            ControllerState::Stopped => return Ok(()),
            ControllerState::Running => {}
        }

        self.state
            .store(ControllerState::Stopped as u8, Ordering::Release);
        if let Some(submitter) = self.submitter.read().as_ref() {
            submitter.signal_shutdown()?;
        }
        info!("Timer controller shutdown requested");
        Ok(())
    }

    /// Wait for the loop thread to exit and report how it ended.
    ///
    /// Blocks until [`shutdown`](Self::shutdown) has been observed or the loop
    /// fails. Returns `Ok(())` if there is no thread left to join.
    ///
    /// # Errors
    ///
    /// The loop's own error, or [`TimerError::LoopPanicked`].
    pub fn join(&self) -> TimerResult<()> {
        let Some(handle) = self.thread.lock().take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(TimerError::LoopPanicked),
        }
    }

    /// Take a task from the recycle pool, or a fresh empty one.
    #[must_use]
    pub fn acquire_task(&self) -> Box<TimerTask> {
        self.pool.acquire()
    }

    /// Number of recycled tasks waiting in the pool.
    #[must_use]
    pub fn pooled_tasks(&self) -> usize {
        self.pool.len()
    }

    /// Snapshot of the loop counters.
    #[must_use]
    pub fn stats(&self) -> TimerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        ControllerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the controller accepts tasks.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == ControllerState::Running
    }

    /// The configuration this controller was created with.
    #[must_use]
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    fn running_submitter(&self) -> TimerResult<Arc<Submitter>> {
        match self.state() {
            ControllerState::Uninitialized => Err(TimerError::NotInitialized),
            ControllerState::Stopped => Err(TimerError::Stopped),
            ControllerState::Running => self
                .submitter
                .read()
                .as_ref()
                .map(Arc::clone)
                .ok_or(TimerError::NotInitialized),
        }
    }
}

impl Default for TimerController {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl fmt::Debug for TimerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerController")
            .field("state", &self.state())
            .field("config", &self.config)
            .field("pooled_tasks", &self.pool.len())
            .finish_non_exhaustive()
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        if self.is_running()
            && let Err(e) = self.shutdown()
        {
            warn!(error = %e, "Timer controller shutdown failed during drop");
        }

        let on_loop_thread = self
            .thread
            .lock()
            .as_ref()
            .is_some_and(|handle| handle.thread().id() == thread::current().id());
        if on_loop_thread {
            return;
        }
        if let Err(e) = self.join() {
            warn!(error = %e, "Timer loop exited with an error");
        }
    }
}
