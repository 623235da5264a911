//! Error types for the timer service.
//!
//! Initialization failures surface synchronously from `init()`. Failures of
//! the OS primitives at runtime are fatal to the loop thread and are reported
//! through [`crate::TimerController::join`].

use deadline_core::CoreError;
use std::io;
use thiserror::Error;

/// Errors that can occur in the timer service.
#[derive(Debug, Error)]
pub enum TimerError {
    /// An OS primitive could not be created during `init()`.
    #[error("Failed to initialize {primitive}: {source}")]
    Init {
        /// Which primitive failed (eventfd, timerfd, epoll, ...).
        primitive: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The loop thread could not be spawned.
    #[error("Failed to spawn timer loop thread: {0}")]
    ThreadSpawn(#[source] io::Error),

    /// The controller has not been initialized.
    #[error("Timer controller is not initialized")]
    NotInitialized,

    /// The controller has been shut down and cannot be restarted.
    #[error("Timer controller is stopped")]
    Stopped,

    /// Reading the monotonic clock failed.
    #[error("Failed to read monotonic clock: {0}")]
    TimeSource(#[source] io::Error),

    /// Writing to or reading from the notifier failed.
    #[error("Notifier signal failed: {0}")]
    Signal(#[source] io::Error),

    /// Programming the OS timer failed.
    #[error("Failed to arm OS timer: {0}")]
    Arm(#[source] io::Error),

    /// Waiting on the multiplexer failed with a non-interrupt error.
    #[error("Multiplexer wait failed: {0}")]
    Wait(#[source] io::Error),

    /// The loop thread terminated by panicking.
    #[error("Timer loop thread panicked")]
    LoopPanicked,

    /// Deadline computation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TimerError {
    /// Create an initialization error for the named primitive.
    #[must_use]
    pub fn init(primitive: &'static str, source: io::Error) -> Self {
        Self::Init { primitive, source }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Whether the error came from the lifecycle state rather than the OS.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::Stopped)
    }
}

/// A specialized `Result` type for timer service operations.
pub type TimerResult<T> = std::result::Result<T, TimerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use deadline_core::Deadline;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let err = TimerError::init("timerfd", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.to_string().contains("timerfd"));

        let err = TimerError::invalid_config("max_events must be greater than 0");
        assert!(err.to_string().contains("max_events"));
    }

    #[test]
    fn test_core_error_converts() {
        let core = CoreError::deadline_overflow(Deadline::new(1, 0), Duration::MAX);
        let err = TimerError::from(core);
        assert!(matches!(err, TimerError::Core(_)));
        assert!(!err.is_lifecycle());
        assert!(TimerError::Stopped.is_lifecycle());
    }
}
