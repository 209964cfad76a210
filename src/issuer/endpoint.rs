//! Token Endpoint
//!
//! Server side of `POST /token`.

use tracing::debug;

use crate::core::{HttpMethod, HttpRequest, HttpResponse};
use crate::error::ErrorResponse;
use crate::issuer::RandomCredentialIssuer;

/// Path served by the token endpoint.
pub const TOKEN_PATH: &str = "/token";

/// Token endpoint handler. Client credentials are not validated.
#[derive(Debug, Clone, Default)]
pub struct TokenEndpoint {
    issuer: RandomCredentialIssuer,
}

impl TokenEndpoint {
    /// Create endpoint backed by the default issuer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create endpoint backed by a custom issuer.
    pub fn with_issuer(issuer: RandomCredentialIssuer) -> Self {
        Self { issuer }
    }

    /// Serve one request. `path` is the request path without query string.
    pub fn handle(&self, path: &str, request: &HttpRequest) -> HttpResponse {
        if path != TOKEN_PATH {
            return HttpResponse::json(
                404,
                &ErrorResponse {
                    message: "Not Found".to_string(),
                },
            );
        }

        if request.method != HttpMethod::Post {
            return HttpResponse::json(
                405,
                &ErrorResponse {
                    message: "Method Not Allowed".to_string(),
                },
            );
        }

        let credential = self.issuer.issue();
        debug!(fingerprint = %credential.fingerprint(), "Token endpoint issued credential");
        HttpResponse::json(200, &credential.to_response())
    }
}
