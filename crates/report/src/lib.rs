//! # Report
//!
//! Fan-out of run outcomes to sinks.
//!
//! Responsibilities:
//! - Instantiate sinks from configuration (log, JSON file)
//! - One worker task and bounded queue per sink
//! - Per-sink metrics (writes, failures, drops)
//!
//! A slow or failing sink never blocks the others; delivery is
//! best-effort with counted drops.

mod error;
mod handle;
mod metrics;
mod reporter;
mod sinks;

pub use error::ReporterError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use reporter::{create_reporter, Reporter, ReporterBuilder, ReporterConfig};
pub use sinks::{JsonFileSink, LogSink};
