//! LogSink - logs outcome summaries via tracing

use contracts::{MonitorError, MonitorOutcome, ReportSink};
use tracing::{info, instrument, warn};

/// Sink that logs run summaries
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_outcome(&self, outcome: &MonitorOutcome) {
        match outcome {
            MonitorOutcome::Completed(report) => {
                let frequency_violations = report.frequency.violations().count();
                if report.passed() {
                    info!(
                        sink = %self.name,
                        window_secs = report.capture.window_secs,
                        trimmed_groups = report.capture.trimmed_group_count,
                        "run passed: channels in lock-step"
                    );
                } else {
                    warn!(
                        sink = %self.name,
                        frequency_violations,
                        skipped_frames = report.skips.skips.len(),
                        laggy_frames = report.sync.laggy_frames.len(),
                        "run failed"
                    );
                }
            }
            MonitorOutcome::Skipped { reason } => {
                info!(sink = %self.name, reason = %reason, "run skipped");
            }
        }
    }
}

impl ReportSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_write", skip(self, outcome), fields(sink = %self.name))]
    async fn write(&mut self, outcome: &MonitorOutcome) -> Result<(), MonitorError> {
        self.log_outcome(outcome);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), MonitorError> {
        // Nothing buffered for a log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), MonitorError> {
        info!(sink = %self.name, "log sink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let outcome = MonitorOutcome::Skipped {
            reason: "no hardware".into(),
        };

        assert!(sink.write(&outcome).await.is_ok());
        assert!(sink.flush().await.is_ok());
        assert!(sink.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
