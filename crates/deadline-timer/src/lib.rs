//! In-process deadline timer service.
//!
//! Any thread may schedule a one-shot or recurring callback to fire at a
//! future monotonic deadline. A single dedicated loop thread owns the deadline
//! heap and executes every callback serially, earliest deadline first.
//!
//! # Architecture
//!
//! - **Submission queue**: producers push scheduled tasks under a short-hold
//!   lock and bump a counter notifier
//! - **Loop thread**: waits on a multiplexer over the notifier and an OS
//!   timer; drains submissions, fires at most one due task per timer wake and
//!   rearms the OS timer to the new earliest deadline
//! - **Recurring tasks**: each next deadline chains off the previous deadline,
//!   so callback latency never accumulates as drift
//! - **Task pool**: fired one-shot tasks are reset and kept for reuse
//!
//! On Linux the primitives are `eventfd`, `timerfd` and `epoll` on
//! `CLOCK_MONOTONIC`; other platforms use a mutex and condition variable.
//!
//! # Example
//!
//! ```rust,no_run
//! use deadline_timer::{TimerConfig, TimerController, TimerTask};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), deadline_timer::TimerError> {
//! let controller = TimerController::new(TimerConfig::default());
//! controller.init()?;
//!
//! controller.add_timer_task(TimerTask::once(Duration::from_millis(50), || {
//!     println!("fired");
//! }))?;
//! controller.add_timer_task(TimerTask::recurring(Duration::from_millis(10), || {
//!     println!("tick");
//! }))?;
//!
//! std::thread::sleep(Duration::from_millis(100));
//! controller.shutdown()?;
//! controller.join()?;
//! # Ok(())
//! # }
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod controller;
pub mod error;
pub mod platform;
pub mod stats;

mod event_loop;
mod submission;

pub mod prelude;

pub use config::{TimerConfig, TimerConfigBuilder};
pub use controller::{ControllerState, TimerController};
pub use deadline_core::{CoreError, Deadline, TaskPool, TimerTask};
pub use error::{TimerError, TimerResult};
pub use stats::{LATE_FIRE_THRESHOLD, TimerStats, TimerStatsSnapshot};

use std::sync::OnceLock;

static GLOBAL: OnceLock<TimerController> = OnceLock::new();

/// The process-wide controller, created with the default configuration on
/// first use. It is never dropped; call [`shutdown`] to stop it.
pub fn global() -> &'static TimerController {
    GLOBAL.get_or_init(TimerController::default)
}

/// Initialize the process-wide controller.
///
/// # Errors
///
/// See [`TimerController::init`].
pub fn init() -> TimerResult<()> {
    global().init()
}

/// Schedule a task on the process-wide controller.
///
/// # Errors
///
/// See [`TimerController::add_timer_task`].
pub fn add_timer_task(task: impl Into<Box<TimerTask>>) -> TimerResult<()> {
    global().add_timer_task(task)
}

/// Stop the process-wide controller.
///
/// # Errors
///
/// See [`TimerController::shutdown`].
pub fn shutdown() -> TimerResult<()> {
    global().shutdown()
}

/// Current reading of the clock deadlines are measured against.
///
/// # Errors
///
/// [`TimerError::TimeSource`] if the clock cannot be read.
pub fn now() -> TimerResult<Deadline> {
    platform::monotonic_now().map_err(TimerError::TimeSource)
}
