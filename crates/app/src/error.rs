//! CLI error type.

use bankline_application::{GatewayError, StoreError, TransportError};
use bankline_infrastructure::FilePartError;
use thiserror::Error;

/// Anything that can stop a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The token store could not be opened.
    #[error("token store: {0}")]
    Store(#[from] StoreError),

    /// The HTTP transport could not be built.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The call failed.
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// An upload could not be read.
    #[error("{0}")]
    Upload(#[from] FilePartError),

    /// A command argument was malformed.
    #[error("invalid argument: {0}")]
    Argument(String),
}
