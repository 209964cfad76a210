//! Configuration Types
//!
//! Retry configuration (workflow wire shape) and task client configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::core::HttpMethod;
use crate::error::{ConfigurationError, TaskError, AUTHORIZATION_FAILURE_CODE};

/// Default maximum number of invocations per run.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default backoff multiplier (constant interval).
pub const DEFAULT_BACKOFF_RATE: f64 = 1.0;
/// Default interval before the first retry, in seconds.
pub const DEFAULT_INITIAL_INTERVAL_SECS: f64 = 2.0;
/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure codes that may appear in `retryableFailureCodes`.
pub const RETRYABLE_FAILURE_CODES: &[&str] = &[AUTHORIZATION_FAILURE_CODE];

/// Retry configuration consumed by the orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Maximum number of invocations, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Multiplier applied to the interval after each failed attempt.
    #[serde(default = "default_backoff_rate")]
    pub backoff_rate: f64,
    /// Wait before the first retry.
    #[serde(default = "default_initial_interval")]
    pub initial_interval_seconds: f64,
    /// Failure codes that trigger a retry.
    #[serde(default = "default_retryable_codes")]
    pub retryable_failure_codes: BTreeSet<String>,
    /// Upper bound on a single wait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_seconds: Option<f64>,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_rate() -> f64 {
    DEFAULT_BACKOFF_RATE
}

fn default_initial_interval() -> f64 {
    DEFAULT_INITIAL_INTERVAL_SECS
}

fn default_retryable_codes() -> BTreeSet<String> {
    [AUTHORIZATION_FAILURE_CODE.to_string()].into_iter().collect()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_rate: default_backoff_rate(),
            initial_interval_seconds: default_initial_interval(),
            retryable_failure_codes: default_retryable_codes(),
            max_delay_seconds: None,
        }
    }
}

impl RetryConfig {
    /// Check the bounds every field must satisfy.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.max_attempts < 1 {
            return Err(invalid("maxAttempts must be at least 1"));
        }
        if !self.backoff_rate.is_finite() || self.backoff_rate < 1.0 {
            return Err(invalid("backoffRate must be a finite number >= 1"));
        }
        if !is_positive_duration(self.initial_interval_seconds) {
            return Err(invalid(
                "initialIntervalSeconds must be a positive number of seconds within Duration range",
            ));
        }
        if let Some(max) = self.max_delay_seconds {
            if !is_positive_duration(max) {
                return Err(invalid(
                    "maxDelaySeconds must be a positive number of seconds within Duration range",
                ));
            }
        }
        for code in &self.retryable_failure_codes {
            if !RETRYABLE_FAILURE_CODES.contains(&code.as_str()) {
                return Err(TaskError::Configuration(
                    ConfigurationError::UnsupportedFailureCode { code: code.clone() },
                ));
            }
        }
        Ok(())
    }
}

fn is_positive_duration(secs: f64) -> bool {
    secs > 0.0 && Duration::try_from_secs_f64(secs).is_ok()
}

fn invalid(message: &str) -> TaskError {
    TaskError::Configuration(ConfigurationError::InvalidRetryConfig {
        message: message.to_string(),
    })
}

/// Task client configuration.
#[derive(Clone, Debug)]
pub struct TaskConfig {
    /// Token endpoint URL (`POST /token`).
    pub token_endpoint: String,
    /// Client id for HTTP Basic authentication at the token endpoint.
    pub client_id: Option<String>,
    /// Client secret paired with `client_id`.
    pub client_secret: Option<SecretString>,
    /// Task endpoint URL.
    pub task_endpoint: String,
    /// HTTP method used for the task endpoint.
    pub method: HttpMethod,
    /// Caller payload merged into every task request body.
    pub payload: serde_json::Map<String, serde_json::Value>,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
}
