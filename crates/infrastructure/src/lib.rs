//! Bankline Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod http;
pub mod serialization;
pub mod settings;
pub mod store;

pub use adapters::{ReqwestTransport, SessionSignal, SessionState, SystemClock};
pub use http::{FilePartError, build_form, file_part};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
pub use settings::{
    ApiSettings, AuthSettings, GatewayConfig, LoggingSettings, SettingsError, StoreSettings,
};
pub use store::{FileTokenStore, MemoryTokenStore};
