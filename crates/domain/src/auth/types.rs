//! Wire types for the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{CredentialPair, UserRole};

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token to exchange.
    pub refresh_token: String,
}

/// Body of `POST /auth/logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// The refresh token to revoke.
    pub refresh_token: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// A freshly issued token pair as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    /// New access token.
    pub token: String,
    /// New refresh token.
    pub refresh_token: String,
    /// Access token expiry.
    pub token_expires_at: DateTime<Utc>,
    /// Refresh token expiry.
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl TokenGrant {
    /// Converts the grant into the pair kept by the token store.
    #[must_use]
    pub fn into_credentials(self) -> CredentialPair {
        CredentialPair {
            access_token: self.token,
            refresh_token: self.refresh_token,
            access_token_expires_at: self.token_expires_at,
            refresh_token_expires_at: self.refresh_token_expires_at,
        }
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginGrant {
    /// The issued tokens.
    #[serde(flatten)]
    pub grant: TokenGrant,
    /// Role of the account, if the server reports one the client knows.
    ///
    /// Matched case-insensitively. An unknown role decodes as `None` rather
    /// than failing the whole login.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<UserRole>,
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<UserRole>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|role| role.parse().ok()))
}
