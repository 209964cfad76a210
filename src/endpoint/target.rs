//! Idempotent Target Endpoint
//!
//! Task operation that fails the first contact of a new execution on request
//! and accepts every later attempt of that execution.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::{HttpRequest, HttpResponse};
use crate::endpoint::ExecutionLedger;
use crate::error::{AuthorizationError, ErrorResponse, TaskError};
use crate::orchestrator::TaskInvoker;
use crate::types::{Credential, ExecutionId, TaskRequest, TaskRequestBody, TaskStatusResponse};

/// Message carried by the simulated 401.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Result of one invocation of the task operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvocationResult {
    Success,
    AuthorizationFailure,
}

/// Target endpoint backed by an execution ledger.
pub struct IdempotentTargetEndpoint<L: ExecutionLedger> {
    ledger: Arc<L>,
}

impl<L: ExecutionLedger> IdempotentTargetEndpoint<L> {
    /// Create endpoint over a shared ledger.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Get the ledger.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Run the task operation.
    ///
    /// The credential is accepted as-is; only its presence is part of the
    /// contract. The outcome is a pure function of the ledger state at the
    /// time the request arrives and of `simulate_failure`.
    pub fn invoke(
        &self,
        credential: Option<&str>,
        execution_id: &ExecutionId,
        simulate_failure: bool,
    ) -> InvocationResult {
        let first_contact = self.ledger.check_and_mark(execution_id);

        debug!(
            execution_id = %execution_id,
            first_contact,
            simulate_failure,
            has_credential = credential.is_some(),
            "Task invocation received"
        );

        if first_contact && simulate_failure {
            info!(execution_id = %execution_id, "Simulating authorization failure");
            return InvocationResult::AuthorizationFailure;
        }

        InvocationResult::Success
    }

    /// Serve the task endpoint HTTP contract.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let body: TaskRequestBody = match request
            .body
            .as_deref()
            .map(|b| serde_json::from_str::<TaskRequestBody>(b))
        {
            Some(Ok(body)) => body,
            Some(Err(e)) => {
                return HttpResponse::json(
                    400,
                    &ErrorResponse {
                        message: format!("Invalid request body: {}", e),
                    },
                )
            }
            None => {
                return HttpResponse::json(
                    400,
                    &ErrorResponse {
                        message: "Missing request body".to_string(),
                    },
                )
            }
        };

        match self.invoke(
            request.bearer_token(),
            &body.execution_id,
            body.simulate_failure,
        ) {
            InvocationResult::Success => HttpResponse::json(200, &TaskStatusResponse::ok()),
            InvocationResult::AuthorizationFailure => HttpResponse::json(
                401,
                &ErrorResponse {
                    message: UNAUTHORIZED_MESSAGE.to_string(),
                },
            ),
        }
    }
}

#[async_trait]
impl<L: ExecutionLedger> TaskInvoker for IdempotentTargetEndpoint<L> {
    async fn invoke(
        &self,
        request: &TaskRequest,
        credential: &Credential,
    ) -> Result<TaskStatusResponse, TaskError> {
        match IdempotentTargetEndpoint::invoke(
            self,
            Some(credential.secret()),
            &request.execution_id,
            request.simulate_failure,
        ) {
            InvocationResult::Success => Ok(TaskStatusResponse::ok()),
            InvocationResult::AuthorizationFailure => {
                Err(TaskError::Authorization(AuthorizationError::Unauthorized {
                    message: UNAUTHORIZED_MESSAGE.to_string(),
                }))
            }
        }
    }
}
