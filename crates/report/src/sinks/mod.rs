//! Sink implementations
//!
//! Contains LogSink and JsonFileSink.

mod json_file;
mod log;

pub use self::json_file::JsonFileSink;
pub use self::log::LogSink;
