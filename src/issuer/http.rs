//! HTTP Credential Issuer
//!
//! Client-credentials request against a `POST /token` endpoint.

use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::{create_error_from_response, ProtocolError, TaskError};
use crate::issuer::CredentialIssuer;
use crate::types::{Credential, TokenResponse, DEFAULT_TIMEOUT};

/// Issuer that requests credentials from a remote token endpoint.
pub struct HttpCredentialIssuer<T: HttpTransport> {
    token_endpoint: String,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    timeout: Duration,
    transport: Arc<T>,
}

impl<T: HttpTransport> HttpCredentialIssuer<T> {
    /// Create issuer for `token_endpoint`.
    pub fn new(token_endpoint: impl Into<String>, transport: Arc<T>) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            client_id: None,
            client_secret: None,
            timeout: DEFAULT_TIMEOUT,
            transport,
        }
    }

    /// Authenticate with HTTP Basic client credentials.
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.insert("accept".to_string(), "application/json".to_string());

        if let (Some(client_id), Some(secret)) = (&self.client_id, &self.client_secret) {
            let credentials = format!("{}:{}", client_id, secret.expose_secret());
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            headers.insert("authorization".to_string(), format!("Basic {}", encoded));
        }

        headers
    }
}

#[async_trait]
impl<T: HttpTransport> CredentialIssuer for HttpCredentialIssuer<T> {
    async fn issue_token(&self) -> Result<Credential, TaskError> {
        let http_request = HttpRequest {
            method: HttpMethod::Post,
            url: self.token_endpoint.clone(),
            headers: self.build_request_headers(),
            body: Some("grant_type=client_credentials".to_string()),
            timeout: Some(self.timeout),
        };

        let response = self.transport.send(http_request).await?;

        if response.status != 200 {
            return Err(create_error_from_response(response.status, &response.body));
        }

        let token_response: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            TaskError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;

        let credential = Credential::from_response(&token_response);
        debug!(
            fingerprint = %credential.fingerprint(),
            expires_in = credential.expires_in,
            "Credential issued"
        );

        Ok(credential)
    }
}
