//! HTTP transport port

use async_trait::async_trait;
use bankline_domain::{ApiResponse, Headers, HttpMethod, RequestBody};
use thiserror::Error;

/// A request with its final header set, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base URL
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Final headers, including authorization
    pub headers: Headers,
    /// Body
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Returns the bearer token carried by this request, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Errors for requests that never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Could not connect to the server.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The body could not be encoded for the wire.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for executing HTTP requests against the banking API.
///
/// Every HTTP status is a successful transport result; only requests that
/// never produced a response are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes the request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, connection failure or an unencodable
    /// request.
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, TransportError>;
}
