use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate};

/// Failover configuration
///
/// Both patches are off by default and the backoff schedule is empty, which
/// means a failing query is never retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(Default)]
pub struct FailoverConfig {
    /// Reconnect and retry queries that failed on a lost or read-only connection
    #[serde(default)]
    pub failover_patch_enabled: bool,
    /// Clear cached schema metadata when a query hits an unknown column
    #[serde(default)]
    pub schema_reset_patch_enabled: bool,
    /// Wait before each retry, in seconds, consumed front to back
    #[serde(default)]
    pub backoff_schedule: Vec<f64>,
}

impl FailoverConfig {
    pub fn new(
        failover_patch_enabled: bool,
        schema_reset_patch_enabled: bool,
        backoff_schedule: Vec<f64>,
    ) -> Self {
        Self {
            failover_patch_enabled,
            schema_reset_patch_enabled,
            backoff_schedule,
        }
    }

    /// Whether a failed query may be reconnected and retried at all
    pub fn reconnect_with_backoff(&self) -> bool {
        !self.backoff_schedule.is_empty()
    }

    /// A private, consumable copy of the backoff schedule
    ///
    /// Negative and NaN entries become zero-length waits. Entries too large
    /// for a `Duration` saturate to `Duration::MAX`.
    pub fn backoff_queue(&self) -> VecDeque<Duration> {
        self.backoff_schedule.iter().map(|secs| wait_for(*secs)).collect()
    }
}

fn wait_for(secs: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(wait) => wait,
        Err(_) if secs > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}

impl Validate for FailoverConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (index, secs) in self.backoff_schedule.iter().enumerate() {
            if !secs.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "failover.backoff_schedule[{}] must be a finite number of seconds",
                    index
                )));
            }
            if *secs < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "failover.backoff_schedule[{}] must be >= 0",
                    index
                )));
            }
            if Duration::try_from_secs_f64(*secs).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "failover.backoff_schedule[{}] is too large",
                    index
                )));
            }
        }
        Ok(())
    }
}
