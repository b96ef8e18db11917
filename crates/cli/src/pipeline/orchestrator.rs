//! Run orchestrator - wires bus, daemon, monitor and reporter together.
//!
//! The CLI is a self-contained validation harness: it drives the simulated
//! capture daemon over the in-process loopback bus. A real deployment
//! embeds `monitor::MonitorRun` as a library, pairing it with its own
//! `FrameBus` implementation and a `producer::ProcessProducer` for the
//! actual daemon; a configured `producer.command` is therefore noted but
//! not launched here.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{MonitorBlueprint, MonitorOutcome};
use monitor::MonitorRun;
use observability::record_report_metrics;
use tokio::sync::mpsc;
use tracing::{info, warn};
use transport::{LoopbackBus, SimCaptureDaemon, SimDaemonConfig};

use super::RunStats;

/// Subscription queues hold at least this many messages regardless of the
/// configured rates.
const MIN_QUEUE_CAPACITY: usize = 256;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// The monitoring blueprint
    pub blueprint: MonitorBlueprint,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main run orchestrator
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Run one monitoring window to completion
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();
        let blueprint = self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        if blueprint.producer.command.is_some() {
            warn!(
                producer = %blueprint.producer.name,
                "producer.command is configured but the CLI harness drives the \
                 simulated daemon; embed monitor::MonitorRun with your own bus \
                 to monitor a real daemon"
            );
        }

        // Transport, restricted to the configured channel topology
        let queue_capacity = Self::queue_capacity(&blueprint);
        let bus = LoopbackBus::with_channels(queue_capacity, &blueprint.channel_ids());
        info!(queue_capacity, "loopback bus ready");

        // Simulated capture daemon
        let daemon =
            SimCaptureDaemon::new(SimDaemonConfig::from_blueprint(&blueprint), bus.clone());
        info!(
            channels = blueprint.channels.len(),
            drop_faults = blueprint.simulation.drop_frames.len(),
            lag_faults = blueprint.simulation.lag_frames.len(),
            "simulated daemon configured"
        );

        // Reporter
        let (outcome_tx, outcome_rx) = mpsc::channel::<MonitorOutcome>(4);
        if blueprint.sinks.is_empty() {
            warn!("no sinks configured - outcome is only printed");
        }
        let reporter = report::create_reporter(blueprint.sinks.clone(), outcome_rx)
            .context("Failed to create reporter")?;
        let reporter_handle = reporter.spawn();
        let sink_count = blueprint.sinks.len();

        // The monitor itself
        info!(
            window_secs = blueprint.capture.window_secs,
            warm_up_secs = blueprint.capture.warm_up_secs,
            poll_interval_ms = blueprint.capture.poll_interval_ms,
            "starting monitoring run"
        );
        let channel_count = blueprint.channels.len();
        let run = MonitorRun::new(blueprint);
        let outcome = run
            .execute(&bus, daemon)
            .await
            .context("Monitoring run failed")?;

        if let MonitorOutcome::Completed(report) = &outcome {
            record_report_metrics(report);
        }

        // Fan the outcome out, then let the reporter flush
        if outcome_tx.send(outcome.clone()).await.is_err() {
            warn!("reporter channel closed before outcome delivery");
        }
        drop(outcome_tx);
        if tokio::time::timeout(Duration::from_secs(5), reporter_handle)
            .await
            .is_err()
        {
            warn!("reporter did not flush within 5s");
        }

        let bus_stats = bus.metrics().snapshot();
        info!(
            published = bus_stats.published,
            dropped = bus_stats.dropped,
            duration_secs = start_time.elapsed().as_secs_f64(),
            "orchestration complete"
        );

        Ok(RunStats {
            outcome: Some(outcome),
            duration: start_time.elapsed(),
            channels: channel_count,
            sinks: sink_count,
        })
    }

    /// Queue capacity so one poll interval of lock-step traffic never
    /// fills a subscription.
    fn queue_capacity(blueprint: &MonitorBlueprint) -> usize {
        let max_hz = blueprint
            .channels
            .iter()
            .map(|c| c.frequency_hz)
            .fold(0.0, f64::max);
        let per_poll = max_hz * (blueprint.capture.poll_interval_ms as f64 / 1000.0);
        ((per_poll * 8.0).ceil() as usize).max(MIN_QUEUE_CAPACITY)
    }
}
