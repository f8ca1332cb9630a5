//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A stored or received timestamp could not be parsed.
    #[error("invalid timestamp for {key}: {value}")]
    InvalidTimestamp {
        /// The field the timestamp belongs to.
        key: String,
        /// The raw value.
        value: String,
    },

    /// The user role is not one the client knows about.
    #[error("unknown user role: {0}")]
    UnknownRole(String),

    /// A response payload did not match the expected shape.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
