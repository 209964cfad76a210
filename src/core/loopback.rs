//! Loopback Transport
//!
//! In-process transport that serves the token and task contracts without
//! opening sockets. Requests to `/token` go to the token endpoint; every
//! other path goes to the target endpoint.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::core::{HttpRequest, HttpResponse, HttpTransport};
use crate::endpoint::{ExecutionLedger, IdempotentTargetEndpoint};
use crate::error::{ConfigurationError, TaskError};
use crate::issuer::{TokenEndpoint, TOKEN_PATH};

/// Transport wired to in-process endpoints.
pub struct LoopbackTransport<L: ExecutionLedger> {
    token_endpoint: TokenEndpoint,
    target: Arc<IdempotentTargetEndpoint<L>>,
    request_history: Mutex<Vec<HttpRequest>>,
    next_error: Mutex<Option<TaskError>>,
}

impl<L: ExecutionLedger> LoopbackTransport<L> {
    /// Create loopback transport.
    pub fn new(token_endpoint: TokenEndpoint, target: Arc<IdempotentTargetEndpoint<L>>) -> Self {
        Self {
            token_endpoint,
            target,
            request_history: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    /// Fail the next request with a transport error before it is routed.
    pub fn fail_next(&self, error: TaskError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().unwrap().clone()
    }

    /// Requests that reached the target endpoint.
    pub fn task_requests(&self) -> Vec<HttpRequest> {
        self.get_requests()
            .into_iter()
            .filter(|r| request_path(&r.url).map_or(true, |p| p != TOKEN_PATH))
            .collect()
    }

    /// Requests that reached the token endpoint.
    pub fn token_requests(&self) -> Vec<HttpRequest> {
        self.get_requests()
            .into_iter()
            .filter(|r| request_path(&r.url).is_some_and(|p| p == TOKEN_PATH))
            .collect()
    }
}

fn request_path(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.path().to_string())
}

#[async_trait]
impl<L: ExecutionLedger> HttpTransport for LoopbackTransport<L> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TaskError> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }

        let path = request_path(&request.url).ok_or_else(|| {
            TaskError::Configuration(ConfigurationError::InvalidEndpoint {
                url: request.url.clone(),
            })
        })?;

        self.request_history.lock().unwrap().push(request.clone());

        if path == TOKEN_PATH {
            Ok(self.token_endpoint.handle(&path, &request))
        } else {
            Ok(self.target.handle(&request))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HttpMethod;
    use crate::endpoint::InMemoryExecutionLedger;
    use crate::error::NetworkError;
    use std::collections::HashMap;

    fn transport() -> LoopbackTransport<InMemoryExecutionLedger> {
        let target = Arc::new(IdempotentTargetEndpoint::new(Arc::new(
            InMemoryExecutionLedger::new(),
        )));
        LoopbackTransport::new(TokenEndpoint::new(), target)
    }

    fn request(method: HttpMethod, url: &str, body: Option<&str>) -> HttpRequest {
        HttpRequest {
            method,
            url: url.to_string(),
            headers: HashMap::new(),
            body: body.map(str::to_string),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_routes_by_path() {
        let transport = transport();

        let token = transport
            .send(request(HttpMethod::Post, "http://loopback/token", None))
            .await
            .unwrap();
        assert_eq!(token.status, 200);
        assert!(token.body.contains("access_token"));

        let task = transport
            .send(request(
                HttpMethod::Get,
                "http://loopback/",
                Some(r#"{"executionId":"e","simulateFailure":false}"#),
            ))
            .await
            .unwrap();
        assert_eq!(task.status, 200);

        assert_eq!(transport.token_requests().len(), 1);
        assert_eq!(transport.task_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let transport = transport();
        transport.fail_next(TaskError::Network(NetworkError::ConnectionFailed {
            message: "reset".to_string(),
        }));

        let result = transport
            .send(request(HttpMethod::Post, "http://loopback/token", None))
            .await;
        assert!(result.is_err());
        assert!(transport.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let transport = transport();
        let result = transport
            .send(request(HttpMethod::Get, "not a url", None))
            .await;

        assert!(matches!(
            result,
            Err(TaskError::Configuration(
                ConfigurationError::InvalidEndpoint { .. }
            ))
        ));
    }
}
