//! Sign-in, sign-out and session inspection on top of the gateway.

mod service;

pub use service::AuthService;
