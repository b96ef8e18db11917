//! # Monitor
//!
//! Windowed multi-channel frame-synchronization monitor.
//!
//! One run is a single linear pipeline:
//! capture window (producer start → warm-up → poll/drain loop → guaranteed
//! producer stop) → per-channel buffers → frequency check, and in parallel
//! aggregation by frame identifier → edge trimming → skip and sync checks.
//!
//! ## Usage Example
//!
//! ```ignore
//! use monitor::MonitorRun;
//!
//! let run = MonitorRun::new(blueprint);
//! match run.execute(&bus, daemon).await? {
//!     MonitorOutcome::Completed(report) if report.passed() => { /* lock-step held */ }
//!     MonitorOutcome::Completed(report) => { /* inspect report.frequency / skips / sync */ }
//!     MonitorOutcome::Skipped { reason } => { /* environment absent */ }
//! }
//! ```

mod aggregate;
mod buffer;
mod collector;
mod run;
mod validate;
mod window;

pub use aggregate::{group_by_frame_id, trim_edges};
pub use buffer::ChannelBuffer;
pub use collector::StreamCollector;
pub use run::MonitorRun;
pub use validate::{check_frequency, check_skips, check_sync};
pub use window::CaptureWindow;

// Re-export contract types callers need alongside the monitor
pub use contracts::{
    FrequencyRegistry, MonitorBlueprint, MonitorError, MonitorOutcome, ValidationReport,
};
