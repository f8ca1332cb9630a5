//! Response specification type

use serde::de::DeserializeOwned;

use crate::envelope::{ApiEnvelope, is_success_status};
use crate::error::{DomainError, DomainResult};
use crate::request::Headers;

/// Status code the API uses for a missing or expired access token.
pub const UNAUTHORIZED: u16 = 401;

/// A response as received from the transport, for any status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Raw response body
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: u16, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Creates a response with a JSON body.
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        Self {
            status,
            headers,
            body: value.to_string().into_bytes(),
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    /// Returns true for `401 Unauthorized`.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == UNAUTHORIZED
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> DomainResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| DomainError::UnexpectedPayload(e.to_string()))
    }

    /// Decodes the body as an [`ApiEnvelope`].
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not an envelope around `T`.
    pub fn envelope<T: DeserializeOwned>(&self) -> DomainResult<ApiEnvelope<T>> {
        self.decode()
    }

    /// Best-effort extraction of the envelope `message` for error reporting.
    #[must_use]
    pub fn envelope_message(&self) -> Option<String> {
        self.envelope::<serde_json::Value>()
            .ok()
            .and_then(|e| e.message)
    }
}
