//! Authentication domain types.

mod credentials;
mod session;
mod types;

pub use credentials::{CredentialPair, StorageKey, UserRole};
pub use session::SessionStatus;
pub use types::{LoginGrant, LoginRequest, LogoutRequest, RefreshRequest, TokenGrant};
