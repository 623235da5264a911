//! Timer service configuration.

use crate::error::{TimerError, TimerResult};
use deadline_core::DEFAULT_POOL_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default name of the loop thread.
pub const DEFAULT_THREAD_NAME: &str = "deadline-timer";

/// Default delay of the first timer expiry after `init()`.
pub const DEFAULT_INITIAL_ARM_DELAY: Duration = Duration::from_secs(1);

/// Default periodic fallback re-check interval.
pub const DEFAULT_FALLBACK_INTERVAL: Duration = Duration::from_millis(1);

/// Default number of readiness events fetched per multiplexer wait.
pub const DEFAULT_MAX_EVENTS: usize = 20;

/// Timer controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Name given to the loop thread.
    pub thread_name: String,
    /// First expiry programmed at `init()`, before any task exists.
    pub initial_arm_delay: Duration,
    /// Periodic re-check programmed alongside every one-shot arm.
    ///
    /// `None` arms pure one-shot expiries.
    pub fallback_interval: Option<Duration>,
    /// Readiness events fetched per multiplexer wait.
    pub max_events: usize,
    /// Maximum number of recycled tasks retained by the pool.
    pub pool_capacity: usize,
    /// Catch callback panics on the loop thread instead of letting them kill it.
    pub isolate_panics: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            initial_arm_delay: DEFAULT_INITIAL_ARM_DELAY,
            fallback_interval: Some(DEFAULT_FALLBACK_INTERVAL),
            max_events: DEFAULT_MAX_EVENTS,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            isolate_panics: true,
        }
    }
}

impl TimerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> TimerResult<()> {
        if self.thread_name.is_empty() {
            return Err(TimerError::invalid_config("thread_name must not be empty"));
        }
        if self.initial_arm_delay.is_zero() {
            return Err(TimerError::invalid_config(
                "initial_arm_delay must be greater than 0",
            ));
        }
        if self.fallback_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(TimerError::invalid_config(
                "fallback_interval must be greater than 0 when set",
            ));
        }
        if self.max_events == 0 {
            return Err(TimerError::invalid_config(
                "max_events must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> TimerConfigBuilder {
        TimerConfigBuilder::default()
    }
}

/// Builder for `TimerConfig`.
#[derive(Debug, Default)]
pub struct TimerConfigBuilder {
    config: TimerConfig,
}

impl TimerConfigBuilder {
    /// Set the loop thread name.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Set the first expiry delay.
    #[must_use]
    pub fn initial_arm_delay(mut self, delay: Duration) -> Self {
        self.config.initial_arm_delay = delay;
        self
    }

    /// Set or disable the periodic fallback re-check.
    #[must_use]
    pub fn fallback_interval(mut self, interval: Option<Duration>) -> Self {
        self.config.fallback_interval = interval;
        self
    }

    /// Set the readiness batch size.
    #[must_use]
    pub fn max_events(mut self, max_events: usize) -> Self {
        self.config.max_events = max_events;
        self
    }

    /// Set the pool capacity.
    #[must_use]
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.config.pool_capacity = capacity;
        self
    }

    /// Enable or disable callback panic isolation.
    #[must_use]
    pub fn isolate_panics(mut self, isolate: bool) -> Self {
        self.config.isolate_panics = isolate;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> TimerResult<TimerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
