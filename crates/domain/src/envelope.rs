//! The `{ success, data, message }` envelope every API endpoint responds with.

use serde::{Deserialize, Serialize};

/// Returns true if the status code indicates success (2xx).
#[must_use]
pub const fn is_success_status(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Response envelope wrapping every API payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the server considers the call successful.
    pub success: bool,
    /// The payload, present on success.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Human readable message, usually present on failure.
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Creates a successful envelope around `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Creates a failed envelope with a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// The one success predicate used for auth calls.
    ///
    /// A call succeeded only when the HTTP status is 2xx, the envelope says
    /// `success: true`, and a payload is present.
    #[must_use]
    pub const fn is_success_for(&self, status: u16) -> bool {
        is_success_status(status) && self.success && self.data.is_some()
    }

    /// Consumes the envelope, returning the payload if any.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
