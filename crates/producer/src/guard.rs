//! ProducerGuard - scoped acquisition of the capture daemon.

use contracts::{MonitorError, ProducerControl};
use tracing::{debug, error, instrument};

/// Scoped producer acquisition.
///
/// `start` launches the daemon and hands back the guard; the run holds the
/// guard for its whole lifetime and calls `stop` on its single exit point,
/// success or failure. Because stopping is async it cannot happen inside
/// `Drop`; dropping an armed guard logs an error instead (a
/// `ProcessProducer` additionally reclaims the OS process through
/// `kill_on_drop`).
pub struct ProducerGuard<P: ProducerControl> {
    producer: Option<P>,
    name: String,
}

impl<P: ProducerControl> ProducerGuard<P> {
    /// Launch the daemon and arm the guard.
    #[instrument(name = "producer_guard_start", skip(producer), fields(name = producer.name()))]
    pub async fn start(mut producer: P) -> Result<Self, MonitorError> {
        let name = producer.name().to_string();
        producer.start().await?;
        debug!(name = %name, "producer acquired");
        Ok(Self {
            producer: Some(producer),
            name,
        })
    }

    /// Stop the daemon and disarm the guard. Consumes the guard so release
    /// happens at most once.
    #[instrument(name = "producer_guard_stop", skip(self), fields(name = %self.name))]
    pub async fn stop(mut self) -> Result<(), MonitorError> {
        match self.producer.take() {
            Some(mut producer) => {
                let result = producer.stop().await;
                debug!(name = %self.name, "producer released");
                result
            }
            None => Ok(()),
        }
    }
}

impl<P: ProducerControl> Drop for ProducerGuard<P> {
    fn drop(&mut self) {
        if self.producer.is_some() {
            error!(
                name = %self.name,
                "producer guard dropped while armed, daemon may still be running"
            );
        }
    }
}
