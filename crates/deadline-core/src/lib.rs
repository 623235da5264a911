//! Task model and deadline ordering for the deadline timer service.
//!
//! This crate holds everything the timer service needs that does not touch the
//! operating system:
//!
//! - **Deadline**: absolute monotonic timestamp as normalized `(secs, nanos)`
//! - **TimerTask**: callback, interval, recurrence flag and deadline chain
//! - **TaskPool**: bounded free-list recycling one-shot tasks
//! - **DeadlineHeap**: min-heap yielding the earliest deadline first
//!
//! # Ownership
//!
//! Tasks travel as `Box<TimerTask>` by value. At any instant a task is owned by
//! exactly one of the submission queue, the deadline heap, the pool free-list
//! or the thread currently executing it.
//!
//! # Example
//!
//! ```rust
//! use deadline_core::{Deadline, DeadlineHeap, TimerTask};
//! use std::time::Duration;
//!
//! let anchor = Deadline::new(10, 0);
//! let mut heap = DeadlineHeap::new();
//!
//! for ms in [30, 10, 20] {
//!     let mut task = TimerTask::once(Duration::from_millis(ms), || {})
//!         .with_create_time(anchor);
//!     task.schedule_from(anchor).expect("deadline fits");
//!     heap.push(Box::new(task));
//! }
//!
//! let first = heap.pop_earliest().expect("three tasks queued");
//! assert_eq!(first.deadline(), Deadline::new(10, 10_000_000));
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

pub mod deadline;
pub mod error;
pub mod heap;
pub mod pool;
pub mod task;

pub mod prelude;

pub use deadline::{Deadline, NANOS_PER_SEC};
pub use error::{CoreError, CoreResult};
pub use heap::DeadlineHeap;
pub use pool::{DEFAULT_POOL_CAPACITY, TaskPool};
pub use task::{Callback, TimerTask};
