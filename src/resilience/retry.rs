//! Retry Policy
//!
//! Bounded retry with deterministic exponential backoff for task invocations.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::TaskError;
use crate::types::RetryConfig;

/// Runtime retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of invocations, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failed attempt.
    pub initial_interval: Duration,
    /// Backoff multiplier.
    pub backoff_rate: f64,
    /// Upper bound on a single wait.
    pub max_delay: Option<Duration>,
    /// Failure codes that are retried.
    pub retryable_failure_codes: BTreeSet<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_validated(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Build policy from configuration, validating it first.
    pub fn from_config(config: &RetryConfig) -> Result<Self, TaskError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_interval: seconds(config.initial_interval_seconds),
            backoff_rate: config.backoff_rate,
            max_delay: config.max_delay_seconds.map(seconds),
            retryable_failure_codes: config.retryable_failure_codes.clone(),
        }
    }

    /// Wait inserted after failed attempt `attempt` (1-based):
    /// `initial_interval * backoff_rate^(attempt - 1)`, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let secs = if self.backoff_rate == 1.0 {
            self.initial_interval.as_secs_f64()
        } else {
            self.initial_interval.as_secs_f64() * self.backoff_rate.powi(exponent)
        };

        let delay = if secs.is_finite() {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        };

        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Only authorization failures listed in the policy are retried.
    pub fn is_retryable(&self, error: &TaskError) -> bool {
        error.is_authorization_failure()
            && self.retryable_failure_codes.contains(&error.failure_code())
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Retry statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryStats {
    pub total_runs: u32,
    pub total_attempts: u32,
    pub successful_retries: u32,
    pub exhausted: u32,
    pub fatal_errors: u32,
    pub cancelled: u32,
}
