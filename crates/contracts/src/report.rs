//! ValidationReport - Monitor output
//!
//! Verdicts and diagnostics for one monitoring run. Every failure carries
//! enough raw data (identifiers, counts, timestamps) to reproduce the
//! finding without re-running the capture.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::ChannelId;

/// Result of one monitoring run.
///
/// A skipped run (required environment absent) is deliberately distinct
/// from a completed run with failing validators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MonitorOutcome {
    /// Capture and validation ran to completion
    Completed(ValidationReport),

    /// The run could not start (e.g. producer unavailable) and was skipped
    Skipped { reason: String },
}

impl MonitorOutcome {
    /// True unless a completed run has a failing validator.
    pub fn passed(&self) -> bool {
        match self {
            MonitorOutcome::Completed(report) => report.passed(),
            MonitorOutcome::Skipped { .. } => true,
        }
    }
}

/// All three validator verdicts plus the capture summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// What was captured
    pub capture: CaptureSummary,

    /// Throughput check over raw buffers
    pub frequency: FrequencyReport,

    /// Completeness check over trimmed groups
    pub skips: SkipReport,

    /// Temporal alignment check over trimmed groups
    pub sync: SyncReport,
}

impl ValidationReport {
    /// Overall verdict: every validator must pass.
    pub fn passed(&self) -> bool {
        self.frequency.passed() && self.skips.passed() && self.sync.passed()
    }
}

/// Raw capture shape for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Observation window length (seconds)
    pub window_secs: f64,

    /// Messages captured per channel
    pub messages_per_channel: HashMap<ChannelId, usize>,

    /// Messages dropped at buffer capacity, all channels
    pub dropped_at_capacity: u64,

    /// Frame-id regressions observed while appending, all channels
    pub frame_id_regressions: u64,

    /// Distinct frame identifiers remaining after trimming
    pub trimmed_group_count: usize,
}

/// Per-channel throughput verdicts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencyReport {
    pub checks: Vec<FrequencyCheck>,
}

impl FrequencyReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Channels whose counts fell outside the allowed band.
    pub fn violations(&self) -> impl Iterator<Item = &FrequencyCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// One channel's captured count against its expected count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyCheck {
    pub channel: ChannelId,

    /// `nominal_hz * window_secs`
    pub expected: f64,

    /// Raw buffer length for the channel
    pub actual: usize,

    /// True iff `actual` lies strictly inside the open tolerance band
    pub passed: bool,
}

/// Frame identifiers with at least one absent channel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkipReport {
    /// frame id -> channels that produced nothing for it
    pub skips: BTreeMap<u64, BTreeSet<ChannelId>>,
}

impl SkipReport {
    pub fn passed(&self) -> bool {
        self.skips.is_empty()
    }
}

/// Frame identifiers whose cross-channel spread exceeded tolerance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Tolerance the run was evaluated against (ms)
    pub tolerance_ms: f64,

    /// frame id -> offending spread and per-channel timestamps
    pub laggy_frames: BTreeMap<u64, SpreadDiagnostic>,
}

impl SyncReport {
    pub fn passed(&self) -> bool {
        self.laggy_frames.is_empty()
    }
}

/// Spread diagnostics for one frame identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadDiagnostic {
    /// max - min start-of-frame timestamp across present channels (ms)
    pub spread_ms: f64,

    /// Start-of-frame timestamp per present channel (ms)
    pub timestamps_ms: Vec<(ChannelId, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_report() -> ValidationReport {
        ValidationReport {
            capture: CaptureSummary::default(),
            frequency: FrequencyReport {
                checks: vec![FrequencyCheck {
                    channel: "road_camera".into(),
                    expected: 600.0,
                    actual: 601,
                    passed: true,
                }],
            },
            skips: SkipReport::default(),
            sync: SyncReport {
                tolerance_ms: 0.5,
                laggy_frames: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn test_report_passes_when_all_validators_pass() {
        assert!(passing_report().passed());
    }

    #[test]
    fn test_any_failing_validator_fails_the_report() {
        let mut report = passing_report();
        report
            .skips
            .skips
            .entry(150)
            .or_default()
            .insert("driver_camera".into());
        assert!(!report.passed());
    }

    #[test]
    fn test_skipped_outcome_is_not_a_failure() {
        let outcome = MonitorOutcome::Skipped {
            reason: "producer binary not found".into(),
        };
        assert!(outcome.passed());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = MonitorOutcome::Skipped {
            reason: "no hardware".into(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"skipped\""));
    }
}
