//! Producer error types

use contracts::MonitorError;
use thiserror::Error;

/// Producer specific error
#[derive(Debug, Error)]
pub enum ProducerError {
    /// Daemon command is not configured
    #[error("producer '{name}' has no launch command configured")]
    MissingCommand { name: String },

    /// Daemon is already running
    #[error("producer '{name}' is already running")]
    AlreadyRunning { name: String },

    /// Launch failure
    #[error("failed to launch '{name}': {message}")]
    LaunchFailed { name: String, message: String },

    /// Wrapped MonitorError
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

impl From<ProducerError> for MonitorError {
    fn from(err: ProducerError) -> Self {
        match err {
            ProducerError::Monitor(inner) => inner,
            ProducerError::MissingCommand { ref name }
            | ProducerError::AlreadyRunning { ref name } => {
                MonitorError::producer_spawn(name.clone(), err.to_string())
            }
            ProducerError::LaunchFailed { ref name, ref message } => {
                MonitorError::producer_spawn(name.clone(), message.clone())
            }
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ProducerError>;
