use std::time::Duration;

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the watchdog waits for the next reset (default: 60 seconds).
    pub watchdog_interval_ms: u64,
    /// Reason reported on expiry when the worker never supplied one.
    pub fallback_reason: String,
    /// Capacity of the worker message channel.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            watchdog_interval_ms: 60_000,
            fallback_reason: "notLoading".to_string(),
            channel_capacity: 256,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.watchdog_interval_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "watchdog interval must be greater than zero".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "channel capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_interval_ms)
    }
}
