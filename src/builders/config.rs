//! Configuration Builder
//!
//! Fluent builder for task client configuration.

use secrecy::SecretString;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use crate::core::HttpMethod;
use crate::error::{ConfigurationError, TaskError};
use crate::types::{RetryConfig, TaskConfig, DEFAULT_TIMEOUT};

/// Task configuration builder.
#[derive(Default)]
pub struct TaskConfigBuilder {
    token_endpoint: Option<String>,
    task_endpoint: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    method: Option<HttpMethod>,
    payload: Map<String, Value>,
    timeout: Option<Duration>,
    retry: RetryConfig,
}

impl TaskConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Set task endpoint.
    pub fn task_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.task_endpoint = Some(endpoint.into());
        self
    }

    /// Set client credentials for the token endpoint.
    pub fn client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set task HTTP method. Defaults to GET.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a payload field sent with every task request.
    pub fn payload_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Replace the whole payload.
    pub fn payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set maximum attempts.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }

    /// Set backoff multiplier.
    pub fn backoff_rate(mut self, rate: f64) -> Self {
        self.retry.backoff_rate = rate;
        self
    }

    /// Set initial retry interval.
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.retry.initial_interval_seconds = interval.as_secs_f64();
        self
    }

    /// Cap a single backoff wait.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.retry.max_delay_seconds = Some(max_delay.as_secs_f64());
        self
    }

    /// Build the task configuration.
    pub fn build(self) -> Result<TaskConfig, TaskError> {
        let token_endpoint = required_url("token_endpoint", self.token_endpoint)?;
        let task_endpoint = required_url("task_endpoint", self.task_endpoint)?;

        if self.client_id.is_some() != self.client_secret.is_some() {
            return Err(TaskError::Configuration(ConfigurationError::MissingField {
                field: if self.client_id.is_some() {
                    "client_secret".to_string()
                } else {
                    "client_id".to_string()
                },
            }));
        }

        self.retry.validate()?;

        Ok(TaskConfig {
            token_endpoint,
            client_id: self.client_id,
            client_secret: self.client_secret,
            task_endpoint,
            method: self.method.unwrap_or(HttpMethod::Get),
            payload: self.payload,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retry: self.retry,
        })
    }
}

fn required_url(field: &str, value: Option<String>) -> Result<String, TaskError> {
    let value = value.ok_or_else(|| {
        TaskError::Configuration(ConfigurationError::MissingField {
            field: field.to_string(),
        })
    })?;

    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(TaskError::Configuration(ConfigurationError::InvalidEndpoint {
            url: value,
        })),
    }
}

/// Create a new task configuration builder.
pub fn task_config() -> TaskConfigBuilder {
    TaskConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_success() {
        let config = task_config()
            .token_endpoint("https://auth.example.com/token")
            .task_endpoint("https://api.example.com/")
            .method(HttpMethod::Post)
            .payload_field("hello", json!("world"))
            .max_attempts(5)
            .initial_interval(Duration::from_millis(500))
            .build()
            .unwrap();

        assert_eq!(config.token_endpoint, "https://auth.example.com/token");
        assert_eq!(config.method, HttpMethod::Post);
        assert_eq!(config.payload.get("hello"), Some(&json!("world")));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_interval_seconds, 0.5);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.client_id.is_none());
    }

    #[test]
    fn test_builder_defaults() {
        let config = task_config()
            .token_endpoint("http://localhost/token")
            .task_endpoint("http://localhost/")
            .build()
            .unwrap();

        assert_eq!(config.method, HttpMethod::Get);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_builder_missing_task_endpoint() {
        let result = task_config()
            .token_endpoint("https://auth.example.com/token")
            .build();

        assert!(matches!(
            result,
            Err(TaskError::Configuration(ConfigurationError::MissingField { ref field }))
                if field == "task_endpoint"
        ));
    }

    #[test]
    fn test_builder_invalid_url() {
        let result = task_config()
            .token_endpoint("not a url")
            .task_endpoint("https://api.example.com/")
            .build();

        assert!(matches!(
            result,
            Err(TaskError::Configuration(ConfigurationError::InvalidEndpoint { .. }))
        ));

        let result = task_config()
            .token_endpoint("ftp://auth.example.com/token")
            .task_endpoint("https://api.example.com/")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_retry() {
        let result = task_config()
            .token_endpoint("https://auth.example.com/token")
            .task_endpoint("https://api.example.com/")
            .backoff_rate(0.5)
            .build();

        assert!(matches!(
            result,
            Err(TaskError::Configuration(ConfigurationError::InvalidRetryConfig { .. }))
        ));
    }

    #[test]
    fn test_builder_client_credentials() {
        let config = task_config()
            .token_endpoint("https://auth.example.com/token")
            .task_endpoint("https://api.example.com/")
            .client_credentials("client", "secret")
            .build()
            .unwrap();

        assert_eq!(config.client_id.as_deref(), Some("client"));
        assert!(config.client_secret.is_some());
    }
}
