//! The stored credential pair and the keys it lives under.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Keys used in the durable token store.
///
/// The wire names match what the web client has always written, so a store
/// can be shared with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// The bearer access token.
    AccessToken,
    /// The refresh token.
    RefreshToken,
    /// Expiry of the access token.
    TokenExpiresAt,
    /// Expiry of the refresh token.
    RefreshTokenExpiresAt,
    /// Role of the signed-in user. Not part of the credential pair.
    UserRole,
}

impl StorageKey {
    /// The four keys that make up a credential pair. Always written and
    /// removed together.
    pub const CREDENTIALS: [Self; 4] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::TokenExpiresAt,
        Self::RefreshTokenExpiresAt,
    ];

    /// Returns the key as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
            Self::TokenExpiresAt => "tokenExpiresAt",
            Self::RefreshTokenExpiresAt => "refreshTokenExpiresAt",
            Self::UserRole => "userRole",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular customer.
    #[default]
    User,
    /// Back-office administrator.
    Admin,
}

impl UserRole {
    /// Returns the role as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// Access and refresh token with their expiry instants.
///
/// At most one pair exists in a store at any time and it is only ever
/// replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// The bearer access token.
    pub access_token: String,
    /// The refresh token.
    pub refresh_token: String,
    /// When the access token expires.
    pub access_token_expires_at: DateTime<Utc>,
    /// When the refresh token expires.
    pub refresh_token_expires_at: DateTime<Utc>,
}

impl CredentialPair {
    /// Creates a new credential pair.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token_expires_at: DateTime<Utc>,
        refresh_token_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            access_token_expires_at,
            refresh_token_expires_at,
        }
    }

    /// Flattens the pair into store entries, one per credential key.
    #[must_use]
    pub fn to_entries(&self) -> [(StorageKey, String); 4] {
        [
            (StorageKey::AccessToken, self.access_token.clone()),
            (StorageKey::RefreshToken, self.refresh_token.clone()),
            (
                StorageKey::TokenExpiresAt,
                self.access_token_expires_at.to_rfc3339(),
            ),
            (
                StorageKey::RefreshTokenExpiresAt,
                self.refresh_token_expires_at.to_rfc3339(),
            ),
        ]
    }

    /// Rebuilds a pair from store lookups.
    ///
    /// Returns `Ok(None)` when any of the four entries is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if an expiry entry is present but not RFC 3339.
    pub fn from_lookup<F>(mut lookup: F) -> DomainResult<Option<Self>>
    where
        F: FnMut(StorageKey) -> Option<String>,
    {
        let (Some(access), Some(refresh), Some(access_exp), Some(refresh_exp)) = (
            lookup(StorageKey::AccessToken),
            lookup(StorageKey::RefreshToken),
            lookup(StorageKey::TokenExpiresAt),
            lookup(StorageKey::RefreshTokenExpiresAt),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            access_token: access,
            refresh_token: refresh,
            access_token_expires_at: parse_timestamp(StorageKey::TokenExpiresAt, &access_exp)?,
            refresh_token_expires_at: parse_timestamp(
                StorageKey::RefreshTokenExpiresAt,
                &refresh_exp,
            )?,
        }))
    }

    /// Seconds until the access token expires (negative once expired).
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.access_token_expires_at - now).num_seconds()
    }

    /// Whether the refresh token can still be exchanged.
    #[must_use]
    pub fn can_refresh(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token_expires_at > now
    }
}

fn parse_timestamp(key: StorageKey, value: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DomainError::InvalidTimestamp {
            key: key.to_string(),
            value: value.to_string(),
        })
}
