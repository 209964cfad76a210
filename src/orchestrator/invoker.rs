//! Task Invoker
//!
//! One credential-bearing call to the target endpoint.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{create_error_from_response, ProtocolError, TaskError};
use crate::types::{Credential, TaskRequest, TaskStatusResponse, DEFAULT_TIMEOUT};

/// Task invoker interface.
///
/// An `Err` whose `is_authorization_failure()` is true is the only
/// retryable outcome; every other error ends the run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskInvoker: Send + Sync {
    /// Invoke the task once with `credential`.
    async fn invoke(
        &self,
        request: &TaskRequest,
        credential: &Credential,
    ) -> Result<TaskStatusResponse, TaskError>;
}

/// Invoker that calls the task endpoint over an `HttpTransport`.
pub struct HttpTaskInvoker<T: HttpTransport> {
    transport: Arc<T>,
    timeout: Duration,
}

impl<T: HttpTransport> HttpTaskInvoker<T> {
    /// Create invoker.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(
        &self,
        request: &TaskRequest,
        credential: &Credential,
    ) -> Result<HttpRequest, TaskError> {
        let body = serde_json::to_string(&request.to_body()).map_err(|e| {
            TaskError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("accept".to_string(), "application/json".to_string());
        headers.insert(
            "authorization".to_string(),
            credential.authorization_header(),
        );

        Ok(HttpRequest {
            method: request.method,
            url: request.endpoint.clone(),
            headers,
            body: Some(body),
            timeout: Some(self.timeout),
        })
    }
}

#[async_trait]
impl<T: HttpTransport> TaskInvoker for HttpTaskInvoker<T> {
    async fn invoke(
        &self,
        request: &TaskRequest,
        credential: &Credential,
    ) -> Result<TaskStatusResponse, TaskError> {
        let http_request = self.build_request(request, credential)?;
        let response = self.transport.send(http_request).await?;

        if response.status != 200 {
            return Err(create_error_from_response(response.status, &response.body));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            TaskError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })
    }
}
