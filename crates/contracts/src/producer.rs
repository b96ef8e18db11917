//! ProducerControl trait - capture daemon lifecycle.
//!
//! The daemon itself is an opaque external process; the monitor only drives
//! start/stop and must be able to probe for its presence before a run.

use crate::MonitorError;

/// Lifecycle control over the capture daemon.
///
/// The daemon is a singleton external resource: the monitor assumes
/// exclusive control for the duration of a run and must not leave it
/// running on any exit path. `stop` is therefore required to be idempotent
/// and safe to call even when the daemon was never started.
#[trait_variant::make(ProducerControl: Send)]
pub trait LocalProducerControl {
    /// Daemon name, for logging and diagnostics
    fn name(&self) -> &str;

    /// Probe whether the daemon can run in this environment.
    ///
    /// A `false` answer skips the monitoring run rather than failing it.
    async fn is_available(&self) -> bool;

    /// Launch the daemon.
    async fn start(&mut self) -> Result<(), MonitorError>;

    /// Stop the daemon. Idempotent; `Ok` when already stopped or never
    /// started.
    async fn stop(&mut self) -> Result<(), MonitorError>;
}
