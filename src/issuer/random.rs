//! Random Credential Issuer
//!
//! Stateless local issuer producing 256-bit opaque tokens.

use async_trait::async_trait;
use rand::RngCore;

use crate::error::TaskError;
use crate::issuer::CredentialIssuer;
use crate::types::{Credential, DEFAULT_TOKEN_LIFETIME_SECS};

/// Random bytes per token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Generate an opaque access token (URL-safe base64, no padding).
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

/// Issuer that generates a new random token on every call.
#[derive(Debug, Clone)]
pub struct RandomCredentialIssuer {
    lifetime_secs: u64,
}

impl RandomCredentialIssuer {
    /// Create issuer advertising the default 3600 second lifetime.
    pub fn new() -> Self {
        Self::with_lifetime(DEFAULT_TOKEN_LIFETIME_SECS)
    }

    /// Create issuer advertising a custom lifetime.
    pub fn with_lifetime(lifetime_secs: u64) -> Self {
        Self { lifetime_secs }
    }

    /// Issue synchronously. Always succeeds.
    pub fn issue(&self) -> Credential {
        Credential::new(generate_access_token(), self.lifetime_secs)
    }
}

impl Default for RandomCredentialIssuer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialIssuer for RandomCredentialIssuer {
    async fn issue_token(&self) -> Result<Credential, TaskError> {
        Ok(self.issue())
    }
}
