//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{MonitorOutcome, ReportSink};

use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send outcomes to the worker
    tx: mpsc::Sender<MonitorOutcome>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: ReportSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Enqueue an outcome for the sink (non-blocking)
    ///
    /// Returns true if enqueued, false if the queue was full (outcome
    /// dropped for this sink only).
    pub fn try_send(&self, outcome: MonitorOutcome) -> bool {
        match self.tx.try_send(outcome) {
            Ok(()) => {
                self.metrics.set_queue_len(self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped_count();
                warn!(sink = %self.name, "queue full, outcome dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the sink worker gracefully
    #[instrument(name = "sink_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "worker task panicked");
        }
        debug!(sink = %self.name, "sink handle shutdown complete");
    }
}

/// Worker task that consumes outcomes and writes to the sink
#[instrument(name = "sink_worker_loop", skip(sink, rx, metrics), fields(sink = %name))]
async fn sink_worker<S: ReportSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<MonitorOutcome>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "sink worker started");

    while let Some(outcome) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&outcome).await {
            Ok(()) => {
                metrics.inc_write_count();
            }
            Err(e) => {
                metrics.inc_failure_count();
                // Keep consuming; one failed write must not wedge the sink.
                error!(sink = %name, error = %e, "write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "close failed on shutdown");
    }

    debug!(sink = %name, "sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::MonitorError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    /// Mock sink for testing
    struct MockSink {
        name: String,
        write_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl ReportSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _outcome: &MonitorOutcome) -> Result<(), MonitorError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(MonitorError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), MonitorError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), MonitorError> {
            Ok(())
        }
    }

    fn skipped() -> MonitorOutcome {
        MonitorOutcome::Skipped {
            reason: "test".into(),
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let write_count = Arc::new(AtomicU64::new(0));
        let sink = MockSink {
            name: "test".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 0,
        };

        let handle = SinkHandle::spawn(sink, 10);

        for _ in 0..5 {
            assert!(handle.try_send(skipped()));
        }

        handle.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let write_count = Arc::new(AtomicU64::new(0));
        let sink = MockSink {
            name: "slow".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 100,
        };

        let handle = SinkHandle::spawn(sink, 2);

        for _ in 0..10 {
            handle.try_send(skipped());
        }

        assert!(handle.metrics().dropped_count() > 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let sink = MockSink {
            name: "failing".to_string(),
            write_count: Arc::new(AtomicU64::new(0)),
            should_fail: true,
            delay_ms: 0,
        };

        let handle = SinkHandle::spawn(sink, 10);

        for _ in 0..3 {
            handle.try_send(skipped());
        }

        sleep(Duration::from_millis(50)).await;
        assert!(handle.metrics().failure_count() > 0);

        handle.shutdown().await;
    }
}
