//! Integration tests
//!
//! Full retry protocol over the in-process loopback transport and over real
//! HTTP against a WireMock server.

mod http;
mod loopback;

use serde_json::json;
use std::sync::Arc;
use wiremock::{MockServer, ResponseTemplate};

use http_task_integration::{
    IdempotentTargetEndpoint, InMemoryExecutionLedger, LoopbackTransport, TokenEndpoint,
};

pub type Ledger = InMemoryExecutionLedger;
pub type Target = IdempotentTargetEndpoint<Ledger>;

/// Loopback transport wired to a fresh token endpoint and target.
pub fn loopback() -> (Arc<LoopbackTransport<Ledger>>, Arc<Target>) {
    let target = Arc::new(IdempotentTargetEndpoint::new(Arc::new(
        InMemoryExecutionLedger::new(),
    )));
    let transport = Arc::new(LoopbackTransport::new(TokenEndpoint::new(), target.clone()));
    (transport, target)
}

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Token endpoint response carrying `token`.
pub fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": 3600
    }))
}

pub fn ok_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": "OK"}))
}

pub fn unauthorized_response() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"}))
}
