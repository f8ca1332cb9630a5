//! Application error types

use bankline_domain::DomainError;
use thiserror::Error;

use crate::ports::TransportError;

/// Errors surfaced by the gateway and the auth service.
///
/// Cloneable so one refresh outcome can be handed to every request queued
/// on the same refresh episode.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Envelope message, or a generic description.
        message: String,
        /// Raw response body.
        body: Vec<u8>,
    },

    /// The server answered 2xx but the envelope reported failure.
    #[error("API error: {message}")]
    Api {
        /// Envelope message.
        message: String,
    },

    /// A 401 arrived and no refresh token was stored.
    #[error("not authenticated: {message}")]
    NoRefreshToken {
        /// Message of the 401 that started the episode.
        message: String,
    },

    /// The refresh call failed or was rejected.
    #[error("token refresh failed: {reason}")]
    RefreshFailed {
        /// What went wrong.
        reason: String,
    },

    /// The request owning the refresh was dropped before it finished.
    #[error("token refresh was abandoned")]
    RefreshAbandoned,

    /// The token store could not be read or written.
    #[error("token store error: {0}")]
    Store(String),

    /// A payload could not be encoded or decoded.
    #[error("{0}")]
    Domain(#[from] DomainError),
}

impl GatewayError {
    /// Returns true for errors that ended the session and forced a login
    /// redirect.
    #[must_use]
    pub const fn is_session_terminal(&self) -> bool {
        matches!(
            self,
            Self::NoRefreshToken { .. } | Self::RefreshFailed { .. }
        )
    }

    /// Returns the HTTP status if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
