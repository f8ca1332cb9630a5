//! Bankline Application - Gateway, auth service and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the transport, token store, login redirect and clock)
//! - The authenticated gateway and its single-flight token refresh
//! - The auth service built on top of the gateway
//! - Application-level error handling

pub mod auth;
pub mod error;
pub mod gateway;
pub mod ports;

pub use auth::AuthService;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{AuthRoutes, AuthenticatedGateway, RequestAttempt};
pub use ports::{
    Clock, HttpTransport, LoginRedirect, PreparedRequest, StoreError, TokenStore, TransportError,
};

#[cfg(test)]
mod tests;
