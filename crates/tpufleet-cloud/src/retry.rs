//! Retry policy for node creation
//!
//! Fixed delay between attempts and a hard cap on the attempt count.

use std::time::Duration;
use tpufleet_core::GeneralSettings;

/// Retry configuration for create calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_settings(general: &GeneralSettings) -> Self {
        Self::new(
            general.create_max_attempts,
            Duration::from_millis(general.create_retry_delay_ms),
        )
    }

    /// Whether another attempt is allowed after `attempts` failed ones
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: tpufleet_core::DEFAULT_CREATE_MAX_ATTEMPTS,
            delay: Duration::from_millis(tpufleet_core::DEFAULT_CREATE_RETRY_DELAY_MS),
        }
    }
}
