//! Token Types
//!
//! Bearer credential and token endpoint wire types.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Nominal credential lifetime advertised by the token endpoint, in seconds.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Token response returned by `POST /token`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (always "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expires in seconds.
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Opaque bearer credential owned by the orchestrator.
#[derive(Clone)]
pub struct Credential {
    /// Token value (secret).
    value: SecretString,
    /// Token type.
    pub token_type: String,
    /// When the credential was issued.
    pub issued_at: DateTime<Utc>,
    /// Nominal lifetime in seconds.
    pub expires_in: u64,
}

impl Credential {
    /// Create new credential issued now.
    pub fn new(value: String, expires_in: u64) -> Self {
        Self::issued_at(value, expires_in, Utc::now())
    }

    /// Create credential with an explicit issuance time.
    pub fn issued_at(value: String, expires_in: u64, issued_at: DateTime<Utc>) -> Self {
        Self {
            value: SecretString::new(value),
            token_type: default_token_type(),
            issued_at,
            expires_in,
        }
    }

    /// Create from token response, stamped with the local receive time.
    pub fn from_response(response: &TokenResponse) -> Self {
        Self {
            value: SecretString::new(response.access_token.clone()),
            token_type: response.token_type.clone(),
            issued_at: Utc::now(),
            expires_in: response.expires_in,
        }
    }

    /// Convert to the token endpoint wire shape.
    pub fn to_response(&self) -> TokenResponse {
        TokenResponse {
            access_token: self.value.expose_secret().clone(),
            token_type: self.token_type.clone(),
            expires_in: self.expires_in,
        }
    }

    /// Get token value (for Authorization header).
    pub fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    /// Expiration time, or `None` when the lifetime runs past the
    /// representable date range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)?;
        self.issued_at.checked_add_signed(lifetime)
    }

    /// Check if credential is past its nominal lifetime.
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at <= Utc::now(),
            None => false,
        }
    }

    /// Format as Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.value.expose_secret())
    }

    /// Short SHA-256 fingerprint, safe to log and compare.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.value.expose_secret().as_bytes());
        digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Check whether two credentials carry the same token.
    pub fn same_token(&self, other: &Credential) -> bool {
        self.value.expose_secret() == other.value.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
