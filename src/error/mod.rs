//! Task Error Types
//!
//! Error hierarchy for credential issuance, task invocation and retry configuration.

use std::time::Duration;
use thiserror::Error;

/// Workflow failure code raised by an HTTP 401 from the task endpoint.
pub const AUTHORIZATION_FAILURE_CODE: &str = "States.Http.StatusCode.401";

/// Workflow failure code for transport-level failures.
pub const SOCKET_FAILURE_CODE: &str = "States.Http.Socket";

/// Workflow failure code for protocol and configuration failures.
pub const RUNTIME_FAILURE_CODE: &str = "States.Runtime";

/// Root error type for task invocation.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl TaskError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "TASK_CONFIG",
            Self::Authorization(_) => "TASK_AUTH",
            Self::Network(_) => "TASK_NETWORK",
            Self::Protocol(_) => "TASK_PROTOCOL",
        }
    }

    /// Workflow failure code matched against `retryableFailureCodes`.
    pub fn failure_code(&self) -> String {
        match self {
            Self::Authorization(_) => AUTHORIZATION_FAILURE_CODE.to_string(),
            Self::Network(_) => SOCKET_FAILURE_CODE.to_string(),
            Self::Protocol(ProtocolError::UnexpectedStatus { status, .. }) => {
                format!("States.Http.StatusCode.{}", status)
            }
            Self::Protocol(_) | Self::Configuration(_) => RUNTIME_FAILURE_CODE.to_string(),
        }
    }

    /// Check if the target rejected the presented credential.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },

    #[error("Invalid retry configuration: {message}")]
    InvalidRetryConfig { message: String },

    #[error("Unsupported task method: {method}")]
    UnsupportedMethod { method: String },

    #[error("Failure code is not retryable: {code}")]
    UnsupportedFailureCode { code: String },
}

/// Authorization failure reported by the task endpoint.
#[derive(Error, Debug)]
pub enum AuthorizationError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Protocol/response error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// Result type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Error body returned by the token and task endpoints.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Parse error response from HTTP body.
pub fn parse_error_response(body: &str) -> Option<ErrorResponse> {
    serde_json::from_str(body).ok()
}

/// Create error from a non-success HTTP response.
pub fn create_error_from_response(status: u16, body: &str) -> TaskError {
    let message = parse_error_response(body)
        .map(|r| r.message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        401 => TaskError::Authorization(AuthorizationError::Unauthorized { message }),
        _ => TaskError::Protocol(ProtocolError::UnexpectedStatus { status, message }),
    }
}
