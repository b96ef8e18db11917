//! Transport error types

use thiserror::Error;

/// Transport error
#[derive(Debug, Error)]
pub enum TransportError {
    /// Channel is not part of the bus topology
    #[error("channel '{channel}' is not part of the bus topology")]
    UnknownChannel { channel: String },
}

/// Transport Result alias
pub type Result<T> = std::result::Result<T, TransportError>;
