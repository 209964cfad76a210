//! Credential Issuer
//!
//! Issues opaque bearer credentials. `RandomCredentialIssuer` generates them
//! locally, `HttpCredentialIssuer` fetches them from a `POST /token`
//! endpoint and `TokenEndpoint` serves that endpoint.

pub mod endpoint;
pub mod http;
pub mod random;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::TaskError;
use crate::types::{Credential, DEFAULT_TOKEN_LIFETIME_SECS};

pub use endpoint::{TokenEndpoint, TOKEN_PATH};
pub use http::HttpCredentialIssuer;
pub use random::{generate_access_token, RandomCredentialIssuer, TOKEN_BYTES};

/// Credential issuer interface.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Issue a fresh credential. Never returns a previously issued token.
    async fn issue_token(&self) -> Result<Credential, TaskError>;
}

/// Mock credential issuer for testing.
///
/// Tokens are `mock-token-1`, `mock-token-2`, ... in call order.
#[derive(Default)]
pub struct MockCredentialIssuer {
    issued: AtomicU32,
    next_error: Mutex<Option<TaskError>>,
}

impl MockCredentialIssuer {
    /// Create new mock issuer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with `error`.
    pub fn set_next_error(&self, error: TaskError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Number of credentials issued so far.
    pub fn issued_count(&self) -> u32 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialIssuer for MockCredentialIssuer {
    async fn issue_token(&self) -> Result<Credential, TaskError> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Credential::new(
            format!("mock-token-{}", n),
            DEFAULT_TOKEN_LIFETIME_SECS,
        ))
    }
}

/// Create mock credential issuer for testing.
pub fn create_mock_credential_issuer() -> MockCredentialIssuer {
    MockCredentialIssuer::new()
}
