//! Reporter - main loop for fan-out to sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{MonitorOutcome, SinkConfig, SinkType};

use crate::error::ReporterError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{JsonFileSink, LogSink};

/// Reporter configuration
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Reporter
pub struct ReporterBuilder {
    config: ReporterConfig,
    input_rx: mpsc::Receiver<MonitorOutcome>,
}

impl ReporterBuilder {
    pub fn new(config: ReporterConfig, input_rx: mpsc::Receiver<MonitorOutcome>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the reporter
    #[instrument(name = "reporter_builder_build", skip(self))]
    pub fn build(self) -> Result<Reporter, ReporterError> {
        let handles = Self::initialize_handles(&self.config)?;

        Ok(Reporter {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "reporter_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles(config: &ReporterConfig) -> Result<Vec<SinkHandle>, ReporterError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(sink_config)?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "reporter_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, ReporterError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::JsonFile => {
            let sink = JsonFileSink::from_params(&config.name, &config.params)
                .map_err(|e| ReporterError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// The main Reporter that fans outcomes out to sinks
pub struct Reporter {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<MonitorOutcome>,
}

impl Reporter {
    /// Create a reporter with custom sink handles (for testing)
    pub fn with_handles(
        handles: Vec<SinkHandle>,
        input_rx: mpsc::Receiver<MonitorOutcome>,
    ) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the reporter main loop
    ///
    /// Consumes outcomes from the input channel and fans out to all
    /// sinks. Returns when the input channel is closed and every worker
    /// has flushed.
    #[instrument(name = "reporter_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "reporter started");

        let mut outcome_count: u64 = 0;
        while let Some(outcome) = self.input_rx.recv().await {
            outcome_count += 1;
            for handle in &self.handles {
                handle.try_send(outcome.clone());
            }
        }

        debug!(outcomes = outcome_count, "reporter input closed, shutting down");

        for handle in self.handles {
            handle.shutdown().await;
        }

        info!("reporter shutdown complete");
    }

    /// Spawn the reporter as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}

/// Convenience function to create a reporter from sink configs
#[instrument(name = "reporter_create", skip(sink_configs, input_rx))]
pub fn create_reporter(
    sink_configs: Vec<SinkConfig>,
    input_rx: mpsc::Receiver<MonitorOutcome>,
) -> Result<Reporter, ReporterError> {
    let config = ReporterConfig {
        sinks: sink_configs,
    };
    ReporterBuilder::new(config, input_rx).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn skipped() -> MonitorOutcome {
        MonitorOutcome::Skipped {
            reason: "test".into(),
        }
    }

    #[tokio::test]
    async fn test_reporter_fanout() {
        let (input_tx, input_rx) = mpsc::channel(10);

        let handles = vec![
            SinkHandle::spawn(LogSink::new("sink1"), 10),
            SinkHandle::spawn(LogSink::new("sink2"), 10),
        ];

        let reporter = Reporter::with_handles(handles, input_rx);
        let handle = reporter.spawn();

        for _ in 0..3 {
            input_tx.send(skipped()).await.unwrap();
        }

        drop(input_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_create_reporter_from_config() {
        let (input_tx, input_rx) = mpsc::channel(10);

        let configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 8,
            params: HashMap::new(),
        }];

        let reporter = create_reporter(configs, input_rx).unwrap();
        assert_eq!(reporter.metrics().len(), 1);
        let handle = reporter.spawn();

        input_tx.send(skipped()).await.unwrap();
        drop(input_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_json_file_sink_requires_dir_param() {
        let (_input_tx, input_rx) = mpsc::channel(1);

        let configs = vec![SinkConfig {
            name: "archive".to_string(),
            sink_type: SinkType::JsonFile,
            queue_capacity: 8,
            params: HashMap::new(),
        }];

        let result = create_reporter(configs, input_rx);
        assert!(matches!(result, Err(ReporterError::SinkCreation { .. })));
    }
}
