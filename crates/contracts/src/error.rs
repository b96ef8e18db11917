//! Layered error definitions
//!
//! Categorized by source: config / producer / transport / capture / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum MonitorError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Producer Errors =====
    /// Daemon failed to launch
    #[error("producer '{name}' failed to start: {message}")]
    ProducerSpawn { name: String, message: String },

    /// Daemon failed to stop cleanly
    #[error("producer '{name}' failed to stop: {message}")]
    ProducerStop { name: String, message: String },

    // ===== Transport Errors =====
    /// Subscription could not be established
    #[error("subscribe failed for channel '{channel}': {message}")]
    Subscribe { channel: String, message: String },

    // ===== Capture Errors =====
    /// Too few distinct frame identifiers survived capture to trim.
    /// A precondition on window length versus nominal frequency, reported
    /// before any validator executes.
    #[error(
        "insufficient captured frames: {distinct} distinct identifiers, \
         trimming requires at least {required}"
    )]
    InsufficientFrames { distinct: usize, required: usize },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl MonitorError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create producer spawn error
    pub fn producer_spawn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProducerSpawn {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create producer stop error
    pub fn producer_stop(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProducerStop {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create subscribe error
    pub fn subscribe(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Subscribe {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
