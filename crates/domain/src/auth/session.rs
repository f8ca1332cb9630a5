//! Session status derived from the stored credential pair.

use chrono::{DateTime, Utc};

use super::CredentialPair;

/// Status of the current session for display and gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No credential pair is stored.
    NotAuthenticated,
    /// Access token is valid and not expiring soon.
    Valid {
        /// Seconds until the access token expires.
        seconds_remaining: i64,
    },
    /// Access token is valid but will expire within the buffer.
    Expiring {
        /// Seconds until the access token expires.
        seconds_remaining: i64,
        /// Whether the refresh token is still usable.
        can_refresh: bool,
    },
    /// Access token has expired.
    Expired {
        /// Whether the refresh token is still usable.
        can_refresh: bool,
    },
}

impl SessionStatus {
    /// Evaluates the status of `credentials` at `now`.
    ///
    /// `buffer_seconds` is how close to expiry a token counts as expiring.
    #[must_use]
    pub fn evaluate(
        credentials: Option<&CredentialPair>,
        now: DateTime<Utc>,
        buffer_seconds: i64,
    ) -> Self {
        let Some(pair) = credentials else {
            return Self::NotAuthenticated;
        };

        let remaining = pair.seconds_until_expiry(now);
        let can_refresh = pair.can_refresh(now);

        if remaining <= 0 {
            Self::Expired { can_refresh }
        } else if remaining <= buffer_seconds {
            Self::Expiring {
                seconds_remaining: remaining,
                can_refresh,
            }
        } else {
            Self::Valid {
                seconds_remaining: remaining,
            }
        }
    }

    /// Returns true if the access token is still usable.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Returns true if the session can be kept alive, either because the
    /// access token is valid or because it can be refreshed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NotAuthenticated => false,
            Self::Valid { .. } | Self::Expiring { .. } => true,
            Self::Expired { can_refresh } => *can_refresh,
        }
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not signed in".to_string(),
            Self::Valid { seconds_remaining } => {
                let secs = *seconds_remaining;
                if secs > 3600 {
                    format!("Signed in, token valid for {} hours", secs / 3600)
                } else if secs > 60 {
                    format!("Signed in, token valid for {} minutes", secs / 60)
                } else {
                    format!("Signed in, token valid for {secs} seconds")
                }
            }
            Self::Expiring {
                seconds_remaining,
                can_refresh,
            } => {
                let refresh_hint = if *can_refresh {
                    " (will refresh on next request)"
                } else {
                    ""
                };
                format!("Token expiring in {seconds_remaining} seconds{refresh_hint}")
            }
            Self::Expired { can_refresh } => {
                if *can_refresh {
                    "Token expired (can refresh)".to_string()
                } else {
                    "Session expired, sign in again".to_string()
                }
            }
        }
    }
}
