//! Prelude module for common timer service types.

pub use crate::config::TimerConfig;
pub use crate::controller::{ControllerState, TimerController};
pub use crate::error::{TimerError, TimerResult};
pub use crate::stats::TimerStatsSnapshot;
pub use deadline_core::prelude::*;
