//! Bankline Domain - Core client types
//!
//! This crate defines the domain model for the Bankline API client:
//! credentials, the response envelope, and the request/response shapes
//! exchanged with the banking API. All types here are pure Rust with no
//! I/O dependencies.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod id;
pub mod request;
pub mod response;

pub use auth::{
    CredentialPair, LoginGrant, LoginRequest, LogoutRequest, RefreshRequest, SessionStatus,
    StorageKey, TokenGrant, UserRole,
};
pub use envelope::{ApiEnvelope, is_success_status};
pub use error::{DomainError, DomainResult};
pub use id::generate_id_v7;
pub use request::{ApiRequest, FormPart, Header, Headers, HttpMethod, RequestBody};
pub use response::ApiResponse;
