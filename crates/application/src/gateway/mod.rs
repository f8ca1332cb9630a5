//! Authenticated HTTP gateway.
//!
//! Every outbound call goes through [`AuthenticatedGateway`], which attaches
//! the stored access token, turns a `401` into at most one token refresh per
//! episode, and replays every request that failed while that refresh was in
//! flight.

mod attempt;
mod client;
mod coordinator;
mod prepare;

pub use attempt::RequestAttempt;
pub use client::{AuthRoutes, AuthenticatedGateway};
pub use prepare::prepare;
