//! Reporter error types

use thiserror::Error;

/// Reporter-specific errors
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Sink error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::MonitorError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReporterError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
