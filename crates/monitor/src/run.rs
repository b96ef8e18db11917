//! MonitorRun - the single entry point for one monitoring run.

use contracts::{
    CaptureSummary, FrameBus, FrequencyRegistry, MonitorBlueprint, MonitorError, MonitorOutcome,
    ProducerControl, ValidationReport,
};
use tracing::{info, instrument, warn};

use crate::aggregate::{group_by_frame_id, trim_edges};
use crate::validate::{check_frequency, check_skips, check_sync};
use crate::window::CaptureWindow;

/// One monitoring run over a producer and a bus.
///
/// The run is a single linear pipeline with no retries: capture window →
/// frequency check on raw buffers → aggregate → trim → skip and sync
/// checks on trimmed groups. Every validator runs exactly once; a
/// frequency violation never suppresses the skip or sync checks.
pub struct MonitorRun {
    blueprint: MonitorBlueprint,
}

impl MonitorRun {
    pub fn new(blueprint: MonitorBlueprint) -> Self {
        Self { blueprint }
    }

    /// Execute the run.
    ///
    /// An unavailable producer environment yields `Ok(Skipped)`, which is
    /// deliberately distinct from a completed run with failing validators.
    ///
    /// # Errors
    /// Producer lifecycle failures, subscription failures, and the
    /// insufficient-frames trimming precondition. The producer is stopped
    /// before any of these propagate.
    #[instrument(name = "monitor_run", skip_all, fields(producer = %self.blueprint.producer.name))]
    pub async fn execute<B, P>(&self, bus: &B, producer: P) -> Result<MonitorOutcome, MonitorError>
    where
        B: FrameBus,
        P: ProducerControl,
    {
        if !producer.is_available().await {
            let reason = format!(
                "producer '{}' is not available in this environment",
                producer.name()
            );
            warn!(reason = %reason, "monitoring run skipped");
            metrics::counter!("framelock_runs_total", "outcome" => "skipped").increment(1);
            return Ok(MonitorOutcome::Skipped { reason });
        }

        let capture = &self.blueprint.capture;
        let validation = &self.blueprint.validation;
        let channels = self.blueprint.channel_ids();
        let registry = FrequencyRegistry::from_channels(&self.blueprint.channels);

        let window = CaptureWindow::new(capture.clone());
        let buffers = window.run(producer, bus, &channels, &registry).await?;

        let frequency =
            check_frequency(&buffers, &registry, capture.window_secs, validation.freq_margin);

        let mut groups = group_by_frame_id(&buffers);
        let mut summary = CaptureSummary {
            window_secs: capture.window_secs,
            messages_per_channel: buffers
                .iter()
                .map(|(channel, buffer)| (channel.clone(), buffer.len()))
                .collect(),
            dropped_at_capacity: buffers.values().map(|b| b.dropped_count()).sum(),
            frame_id_regressions: buffers.values().map(|b| b.regression_count()).sum(),
            trimmed_group_count: 0,
        };

        // Fatal precondition: reported before skip/sync ever run.
        trim_edges(&mut groups, validation.trim_rounds)?;
        summary.trimmed_group_count = groups.len();

        let skips = check_skips(&groups, &channels);
        let sync = check_sync(&groups, validation.sync_tolerance_ms);

        let report = ValidationReport {
            capture: summary,
            frequency,
            skips,
            sync,
        };

        for (name, passed) in [
            ("frequency", report.frequency.passed()),
            ("skip", report.skips.passed()),
            ("sync", report.sync.passed()),
        ] {
            metrics::counter!(
                "framelock_validator_verdicts_total",
                "validator" => name,
                "verdict" => if passed { "pass" } else { "fail" }
            )
            .increment(1);
        }
        metrics::counter!(
            "framelock_runs_total",
            "outcome" => if report.passed() { "pass" } else { "fail" }
        )
        .increment(1);

        info!(
            passed = report.passed(),
            frequency = report.frequency.passed(),
            skips = report.skips.passed(),
            sync = report.sync.passed(),
            trimmed_groups = report.capture.trimmed_group_count,
            "monitoring run completed"
        );

        Ok(MonitorOutcome::Completed(report))
    }
}
