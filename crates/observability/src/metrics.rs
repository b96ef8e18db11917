//! ValidationReport metric recording and digests.
//!
//! Converts a finished run's report into Prometheus metrics and into an
//! in-memory digest for summary printing.

use contracts::ValidationReport;
use metrics::{counter, gauge, histogram};

/// Record metrics from a completed run's report.
///
/// Called once per run after the monitor returns.
pub fn record_report_metrics(report: &ValidationReport) {
    gauge!("framelock_report_passed").set(if report.passed() { 1.0 } else { 0.0 });

    // Throughput per channel
    for check in &report.frequency.checks {
        gauge!(
            "framelock_report_expected_messages",
            "channel" => check.channel.to_string()
        )
        .set(check.expected);
        gauge!(
            "framelock_report_actual_messages",
            "channel" => check.channel.to_string()
        )
        .set(check.actual as f64);
    }
    let frequency_violations = report.frequency.violations().count();
    gauge!("framelock_report_frequency_violations").set(frequency_violations as f64);

    // Completeness
    gauge!("framelock_report_skipped_frames").set(report.skips.skips.len() as f64);
    for missing in report.skips.skips.values() {
        for channel in missing {
            counter!(
                "framelock_report_channel_skips_total",
                "channel" => channel.to_string()
            )
            .increment(1);
        }
    }

    // Alignment
    gauge!("framelock_report_laggy_frames").set(report.sync.laggy_frames.len() as f64);
    for diagnostic in report.sync.laggy_frames.values() {
        histogram!("framelock_report_offending_spread_ms").record(diagnostic.spread_ms);
    }

    // Capture shape
    gauge!("framelock_report_dropped_at_capacity")
        .set(report.capture.dropped_at_capacity as f64);
    gauge!("framelock_report_frame_id_regressions")
        .set(report.capture.frame_id_regressions as f64);
}

/// Running min/max/mean over pushed samples
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, sample: f64) {
        if self.count == 0 {
            self.min = sample;
            self.max = sample;
        } else {
            self.min = self.min.min(sample);
            self.max = self.max.max(sample);
        }
        self.count += 1;
        self.sum += sample;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            count: self.count,
            min: if self.count > 0 { self.min } else { 0.0 },
            max: if self.count > 0 { self.max } else { 0.0 },
            mean: if self.count > 0 {
                self.sum / self.count as f64
            } else {
                0.0
            },
        }
    }
}

/// Point-in-time stats view
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "min={:.3} mean={:.3} max={:.3} (n={})",
            self.min, self.mean, self.max, self.count
        )
    }
}

/// Printable digest of one run's report
#[derive(Debug, Clone, Default)]
pub struct ReportDigest {
    /// Total messages captured across channels
    pub total_messages: usize,

    /// Per-channel message count stats
    pub channel_messages: StatsSummary,

    /// Channels outside the frequency band
    pub frequency_violations: Vec<String>,

    /// Frame identifiers with skips
    pub skipped_frames: usize,

    /// Frame identifiers above the sync tolerance
    pub laggy_frames: usize,

    /// Offending spread stats (ms)
    pub offending_spread_ms: StatsSummary,

    /// Overall verdict
    pub passed: bool,
}

impl ReportDigest {
    pub fn from_report(report: &ValidationReport) -> Self {
        let mut channel_stats = RunningStats::default();
        let mut total = 0usize;
        for count in report.capture.messages_per_channel.values() {
            channel_stats.push(*count as f64);
            total += count;
        }

        let mut spread_stats = RunningStats::default();
        for diagnostic in report.sync.laggy_frames.values() {
            spread_stats.push(diagnostic.spread_ms);
        }

        Self {
            total_messages: total,
            channel_messages: channel_stats.summary(),
            frequency_violations: report
                .frequency
                .violations()
                .map(|c| format!("{} expected={} actual={}", c.channel, c.expected, c.actual))
                .collect(),
            skipped_frames: report.skips.skips.len(),
            laggy_frames: report.sync.laggy_frames.len(),
            offending_spread_ms: spread_stats.summary(),
            passed: report.passed(),
        }
    }
}

impl std::fmt::Display for ReportDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Run Digest ===")?;
        writeln!(f, "Messages captured: {}", self.total_messages)?;
        writeln!(f, "Per-channel counts: {}", self.channel_messages)?;
        writeln!(
            f,
            "Frequency violations: {}",
            if self.frequency_violations.is_empty() {
                "none".to_string()
            } else {
                self.frequency_violations.join(", ")
            }
        )?;
        writeln!(f, "Skipped frames: {}", self.skipped_frames)?;
        writeln!(f, "Laggy frames: {}", self.laggy_frames)?;
        if self.laggy_frames > 0 {
            writeln!(f, "Offending spreads (ms): {}", self.offending_spread_ms)?;
        }
        write!(f, "Verdict: {}", if self.passed { "PASS" } else { "FAIL" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        CaptureSummary, FrequencyCheck, FrequencyReport, SkipReport, SpreadDiagnostic,
        SyncReport,
    };
    use std::collections::BTreeMap;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        stats.push(1.0);
        stats.push(3.0);
        stats.push(2.0);

        let summary = stats.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert!((summary.mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats_summary_is_zeroed() {
        let summary = RunningStats::default().summary();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, 0.0);
    }

    #[test]
    fn test_digest_from_failing_report() {
        let mut laggy = BTreeMap::new();
        laggy.insert(
            150,
            SpreadDiagnostic {
                spread_ms: 1.2,
                timestamps_ms: vec![("road_camera".into(), 7500.0)],
            },
        );

        let report = ValidationReport {
            capture: CaptureSummary {
                window_secs: 30.0,
                messages_per_channel: [("road_camera".into(), 600)].into_iter().collect(),
                dropped_at_capacity: 0,
                frame_id_regressions: 0,
                trimmed_group_count: 594,
            },
            frequency: FrequencyReport {
                checks: vec![FrequencyCheck {
                    channel: "road_camera".into(),
                    expected: 600.0,
                    actual: 600,
                    passed: true,
                }],
            },
            skips: SkipReport::default(),
            sync: SyncReport {
                tolerance_ms: 0.5,
                laggy_frames: laggy,
            },
        };

        let digest = ReportDigest::from_report(&report);
        assert_eq!(digest.total_messages, 600);
        assert_eq!(digest.laggy_frames, 1);
        assert!(!digest.passed);
        assert!(digest.frequency_violations.is_empty());

        let rendered = digest.to_string();
        assert!(rendered.contains("FAIL"));
        assert!(rendered.contains("Laggy frames: 1"));
    }
}
