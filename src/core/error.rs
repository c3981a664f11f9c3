//! Error types for the application

use thiserror::Error;

/// Connectivity failures talking to the remote device
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Device did not answer within the timeout")]
    Timeout,

    #[error("Device unreachable: {0}")]
    Unreachable(String),

    #[error("Device sent an unusable response: {0}")]
    BadResponse(String),
}

impl ConnectError {
    /// Transient failures are worth retrying on the next poll; a definitive
    /// device answer (bad status, malformed body) is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConnectError::Timeout | ConnectError::Unreachable(_))
    }
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Registry is empty")]
    EmptyRegistry,

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
