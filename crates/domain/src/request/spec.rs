//! Request specification type

use serde::Serialize;

use super::{FormPart, Headers, HttpMethod, RequestBody};
use crate::error::DomainResult;
use crate::id::generate_id_v7;

/// One logical call to the banking API.
///
/// `path` is relative to the configured base URL. Authorization is never
/// set here; the gateway attaches it per attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base URL, e.g. `/accounts/42`
    pub path: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// Extra headers supplied by the caller
    pub headers: Headers,
    /// Request body
    pub body: RequestBody,
    /// Idempotency key sent as `Idempotency-Key`
    pub idempotency_key: Option<String>,
}

impl ApiRequest {
    /// Creates a request with no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> DomainResult<Self> {
        self.body = RequestBody::json(value)?;
        Ok(self)
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets the idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Sets a freshly generated idempotency key.
    #[must_use]
    pub fn with_generated_idempotency_key(self) -> Self {
        self.with_idempotency_key(generate_id_v7())
    }
}
