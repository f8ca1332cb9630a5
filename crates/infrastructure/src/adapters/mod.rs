//! Port adapters.

mod reqwest_transport;
mod session_signal;
mod system_clock;

pub use reqwest_transport::ReqwestTransport;
pub use session_signal::{SessionSignal, SessionState};
pub use system_clock::SystemClock;
