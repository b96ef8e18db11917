//! ReportSink trait - report fan-out interface.

use crate::{MonitorError, MonitorOutcome};

/// Destination for run outcomes.
///
/// All sink implementations must implement this trait.
#[trait_variant::make(ReportSink: Send)]
pub trait LocalReportSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one run outcome
    ///
    /// # Errors
    /// Returns a write error with sink context.
    async fn write(&mut self, outcome: &MonitorOutcome) -> Result<(), MonitorError>;

    /// Flush buffered output (if any)
    async fn flush(&mut self) -> Result<(), MonitorError>;

    /// Close the sink
    async fn close(&mut self) -> Result<(), MonitorError>;
}
