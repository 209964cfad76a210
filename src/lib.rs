//! HTTP Task Integration
//!
//! Credential-refresh retry protocol for invoking a bearer-protected HTTP
//! task endpoint.
//!
//! # Features
//!
//! - Opaque bearer credential issuance (`POST /token`)
//! - Idempotent target endpoint that fails the first contact of an execution
//! - Bounded retry with a fresh credential per attempt and deterministic backoff
//! - Cancellation at every suspension point
//!
//! # Example
//!
//! ```rust,ignore
//! use http_task_integration::{task_config, TaskClient, TaskOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = task_config()
//!         .token_endpoint("https://auth.example.com/token")
//!         .task_endpoint("https://api.example.com/")
//!         .payload_field("hello", serde_json::json!("world"))
//!         .max_attempts(3)
//!         .build()?;
//!
//!     let client = TaskClient::new(config)?;
//!     let report = client.run(true).await;
//!
//!     match report.outcome {
//!         TaskOutcome::Success { attempts_used } => println!("ok after {attempts_used}"),
//!         other => println!("failed: {}", other.label()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: credentials, execution ids, requests, retry config and run reports
//! - `error`: error hierarchy and workflow failure codes
//! - `core`: HTTP transport (reqwest, mock, in-process loopback)
//! - `issuer`: credential issuance, client and server side
//! - `endpoint`: execution ledger and the idempotent target endpoint
//! - `orchestrator`: run state machine, credential cache and retry runner
//! - `resilience`: retry policy and statistics
//! - `telemetry`: metrics
//! - `builders`: fluent configuration builder
//! - `client`: high-level task client

pub mod builders;
pub mod client;
pub mod core;
pub mod endpoint;
pub mod error;
pub mod issuer;
pub mod orchestrator;
pub mod resilience;
pub mod telemetry;
pub mod types;

// Re-export main client
pub use client::{task_client, TaskClient};

// Re-export builders
pub use builders::{task_config, TaskConfigBuilder};

// Re-export errors
pub use error::{
    create_error_from_response, parse_error_response, AuthorizationError, ConfigurationError,
    ErrorResponse, NetworkError, ProtocolError, TaskError, TaskResult,
    AUTHORIZATION_FAILURE_CODE, RUNTIME_FAILURE_CODE, SOCKET_FAILURE_CODE,
};

// Re-export types
pub use types::{
    // Config
    RetryConfig, TaskConfig, DEFAULT_BACKOFF_RATE, DEFAULT_INITIAL_INTERVAL_SECS,
    DEFAULT_MAX_ATTEMPTS, RETRYABLE_FAILURE_CODES,
    // Token
    Credential, TokenResponse, DEFAULT_TOKEN_LIFETIME_SECS,
    // Task
    ExecutionId, TaskRequest, TaskRequestBody, TaskStatusResponse,
    // Outcome
    AttemptOutcome, AttemptRecord, RunReport, TaskOutcome,
};

// Re-export core components
pub use core::{
    create_mock_transport, create_transport, HttpMethod, HttpRequest, HttpResponse,
    HttpTransport, LoopbackTransport, MockHttpTransport, ReqwestHttpTransport,
};

// Re-export issuers
pub use issuer::{
    create_mock_credential_issuer, generate_access_token, CredentialIssuer,
    HttpCredentialIssuer, MockCredentialIssuer, RandomCredentialIssuer, TokenEndpoint,
    TOKEN_PATH,
};

// Re-export target endpoint
pub use endpoint::{
    create_execution_ledger, ExecutionLedger, IdempotentTargetEndpoint, InMemoryExecutionLedger,
    InvocationResult,
};

// Re-export orchestrator
pub use orchestrator::{
    AttemptResult, CredentialCache, HttpTaskInvoker, RetryOrchestrator, RunState,
    RunStateMachine, TaskInvoker, Terminal,
};

// Re-export resilience
pub use resilience::{RetryPolicy, RetryStats};

// Re-export telemetry
pub use telemetry::{
    create_in_memory_metrics, no_op_metrics, InMemoryMetrics, MetricEntry, MetricLabels,
    NoOpMetrics, TaskMetrics,
};
