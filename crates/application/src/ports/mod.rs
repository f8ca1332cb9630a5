//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the gateway and the outside world.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod clock;
mod http_transport;
mod login_redirect;
mod token_store;

pub use clock::Clock;
pub use http_transport::{HttpTransport, PreparedRequest, TransportError};
pub use login_redirect::LoginRedirect;
pub use token_store::{StoreError, TokenStore};
