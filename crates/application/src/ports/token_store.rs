//! Token store port
//!
//! Synchronous key-value persistence for the credential pair. Reads and
//! writes never suspend, which keeps the gateway's refresh decision free of
//! await points.

use bankline_domain::{CredentialPair, DomainError, StorageKey, UserRole};

/// Errors that can occur while persisting tokens.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored values could not be interpreted.
    #[error("corrupt store: {0}")]
    Corrupt(#[from] DomainError),
}

/// Durable storage for the credential pair and the user role.
///
/// `write_all`, `remove_all` and `get_many` are atomic: no reader observes
/// a batch half applied.
pub trait TokenStore: Send + Sync {
    /// Reads a single value.
    fn get(&self, key: StorageKey) -> Option<String>;

    /// Reads several values in one consistent snapshot.
    fn get_many(&self, keys: &[StorageKey]) -> Vec<Option<String>>;

    /// Writes a batch of entries atomically.
    ///
    /// # Errors
    /// Returns an error if the batch cannot be persisted.
    fn write_all(&self, entries: &[(StorageKey, String)]) -> Result<(), StoreError>;

    /// Removes a batch of keys atomically.
    ///
    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove_all(&self, keys: &[StorageKey]) -> Result<(), StoreError>;

    /// The stored access token.
    fn access_token(&self) -> Option<String> {
        self.get(StorageKey::AccessToken)
    }

    /// The stored refresh token.
    fn refresh_token(&self) -> Option<String> {
        self.get(StorageKey::RefreshToken)
    }

    /// The stored credential pair, if all four fields are present.
    ///
    /// # Errors
    /// Returns an error if a stored expiry is malformed.
    fn credentials(&self) -> Result<Option<CredentialPair>, StoreError> {
        let snapshot = self.get_many(&StorageKey::CREDENTIALS);

        Ok(CredentialPair::from_lookup(|key| {
            StorageKey::CREDENTIALS
                .iter()
                .position(|k| *k == key)
                .and_then(|i| snapshot.get(i).cloned().flatten())
        })?)
    }

    /// Replaces the whole credential pair.
    ///
    /// # Errors
    /// Returns an error if the pair cannot be persisted.
    fn replace_credentials(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        self.write_all(&pair.to_entries())
    }

    /// Removes all four credential fields.
    ///
    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn clear_credentials(&self) -> Result<(), StoreError> {
        self.remove_all(&StorageKey::CREDENTIALS)
    }

    /// The stored user role, ignoring values the client does not know.
    fn user_role(&self) -> Option<UserRole> {
        self.get(StorageKey::UserRole)
            .and_then(|role| role.parse().ok())
    }

    /// Stores the user role.
    ///
    /// # Errors
    /// Returns an error if the role cannot be persisted.
    fn set_user_role(&self, role: UserRole) -> Result<(), StoreError> {
        self.write_all(&[(StorageKey::UserRole, role.as_str().to_string())])
    }
}
