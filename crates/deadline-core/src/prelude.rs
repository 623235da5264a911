//! Prelude module for common task-model types.

pub use crate::deadline::Deadline;
pub use crate::error::{CoreError, CoreResult};
pub use crate::heap::DeadlineHeap;
pub use crate::pool::TaskPool;
pub use crate::task::{Callback, TimerTask};
