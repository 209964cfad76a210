//! Task Client
//!
//! High-level client that fetches credentials from the token endpoint and
//! invokes the task endpoint under the retry protocol.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::{HttpTransport, ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE};
use crate::error::TaskError;
use crate::issuer::HttpCredentialIssuer;
use crate::orchestrator::{HttpTaskInvoker, RetryOrchestrator};
use crate::resilience::{RetryPolicy, RetryStats};
use crate::telemetry::TaskMetrics;
use crate::types::{ExecutionId, RunReport, TaskConfig, TaskRequest};

type Orchestrator<T> = RetryOrchestrator<HttpCredentialIssuer<T>, HttpTaskInvoker<T>>;

/// Task client over one HTTP transport.
pub struct TaskClient<T: HttpTransport = ReqwestHttpTransport> {
    config: TaskConfig,
    orchestrator: Orchestrator<T>,
}

impl TaskClient<ReqwestHttpTransport> {
    /// Create a new task client with the reqwest transport.
    pub fn new(config: TaskConfig) -> Result<Self, TaskError> {
        let transport = ReqwestHttpTransport::with_options(config.timeout, DEFAULT_MAX_RESPONSE_SIZE)?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> TaskClient<T> {
    /// Create a client with a custom transport.
    pub fn with_transport(config: TaskConfig, transport: T) -> Result<Self, TaskError> {
        let policy = RetryPolicy::from_config(&config.retry)?;
        let transport = Arc::new(transport);

        let mut issuer = HttpCredentialIssuer::new(config.token_endpoint.clone(), transport.clone())
            .with_timeout(config.timeout);
        if let (Some(client_id), Some(client_secret)) = (&config.client_id, &config.client_secret) {
            issuer = issuer.with_client_credentials(client_id.clone(), client_secret.clone());
        }

        let invoker = HttpTaskInvoker::new(transport).with_timeout(config.timeout);
        let orchestrator = RetryOrchestrator::new(Arc::new(issuer), Arc::new(invoker), policy);

        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// Set metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn TaskMetrics>) -> Self {
        self.orchestrator = self.orchestrator.with_metrics(metrics);
        self
    }

    /// Get the task configuration.
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Accumulated retry statistics.
    pub fn stats(&self) -> RetryStats {
        self.orchestrator.stats()
    }

    /// Build a request for `execution_id` from the configured endpoint,
    /// method and payload.
    pub fn request(&self, execution_id: ExecutionId, simulate_failure: bool) -> TaskRequest {
        let mut request = TaskRequest::new(
            self.config.task_endpoint.clone(),
            self.config.method,
            execution_id,
            simulate_failure,
        );
        request.payload = self.config.payload.clone();
        request
    }

    /// Run a new execution with a generated id.
    pub async fn run(&self, simulate_failure: bool) -> RunReport {
        let request = self.request(ExecutionId::generate(), simulate_failure);
        self.orchestrator.run(&request).await
    }

    /// Run `request` until it finishes or `cancel` fires.
    pub async fn run_task(&self, request: &TaskRequest, cancel: &CancellationToken) -> RunReport {
        self.orchestrator.run_task(request, cancel).await
    }
}

/// Create a task client with the reqwest transport.
pub fn task_client(config: TaskConfig) -> Result<TaskClient, TaskError> {
    TaskClient::new(config)
}
