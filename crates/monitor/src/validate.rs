//! Invariant validators: frequency, skip, sync.
//!
//! Three independent checks over one capture. Frequency consumes the raw
//! per-channel buffers (total throughput); skip and sync consume the
//! trimmed groups (per-frame alignment). Each check reports its own
//! verdict with enough raw data to reproduce the finding offline.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use contracts::{
    ChannelId, FrameGroup, FrequencyCheck, FrequencyReport, FrequencyRegistry, SkipReport,
    SpreadDiagnostic, SyncReport,
};
use tracing::{instrument, warn};

use crate::buffer::ChannelBuffer;

/// Throughput check: each channel's captured count must lie strictly
/// inside the open band `(expected - slack, expected + slack)` with
/// `expected = nominal_hz * window_secs` and `slack = expected * margin`.
/// The band boundaries themselves fail.
#[instrument(name = "check_frequency", skip_all, fields(window_secs, margin))]
pub fn check_frequency(
    buffers: &HashMap<ChannelId, ChannelBuffer>,
    registry: &FrequencyRegistry,
    window_secs: f64,
    margin: f64,
) -> FrequencyReport {
    let mut checks: Vec<FrequencyCheck> = buffers
        .iter()
        .map(|(channel, buffer)| {
            let expected = registry
                .expected_frames(channel, window_secs)
                .unwrap_or_default();
            let slack = expected * margin;
            let actual = buffer.len();
            let passed =
                (actual as f64) > expected - slack && (actual as f64) < expected + slack;

            if !passed {
                warn!(
                    channel = %channel,
                    expected,
                    actual,
                    "frequency outside tolerance band"
                );
            }
            metrics::gauge!(
                "framelock_channel_messages",
                "channel" => channel.to_string()
            )
            .set(actual as f64);

            FrequencyCheck {
                channel: channel.clone(),
                expected,
                actual,
                passed,
            }
        })
        .collect();

    // HashMap iteration order is arbitrary; reports should not be.
    checks.sort_by(|a, b| a.channel.cmp(&b.channel));

    FrequencyReport { checks }
}

/// Completeness check over the trimmed groups.
///
/// Walks every integer identifier in `[lo, hi)` - half-open, the maximum
/// is excluded by producer convention - and records the configured
/// channels absent from that identifier's group. An identifier with no
/// group at all counts as missing every channel.
#[instrument(name = "check_skips", skip_all, fields(groups = groups.len()))]
pub fn check_skips(groups: &BTreeMap<u64, FrameGroup>, channels: &[ChannelId]) -> SkipReport {
    let mut report = SkipReport::default();

    let (Some(lo), Some(hi)) = (
        groups.keys().next().copied(),
        groups.keys().next_back().copied(),
    ) else {
        return report;
    };

    for frame_id in lo..hi {
        let missing: BTreeSet<ChannelId> = match groups.get(&frame_id) {
            Some(group) => channels
                .iter()
                .filter(|channel| !group.contains(channel))
                .cloned()
                .collect(),
            None => channels.iter().cloned().collect(),
        };

        if !missing.is_empty() {
            warn!(frame_id, missing = ?missing, "frame skipped on some channels");
            report.skips.insert(frame_id, missing);
        }
    }

    metrics::counter!("framelock_frame_skips_total").increment(report.skips.len() as u64);
    report
}

/// Temporal alignment check over the trimmed groups.
///
/// The spread of a group is max minus min start-of-frame timestamp across
/// whichever channels are present; completeness is not required here. A
/// group whose spread exceeds the tolerance is reported with its full
/// per-channel timestamp list.
#[instrument(name = "check_sync", skip_all, fields(groups = groups.len(), tolerance_ms))]
pub fn check_sync(groups: &BTreeMap<u64, FrameGroup>, tolerance_ms: f64) -> SyncReport {
    let mut report = SyncReport {
        tolerance_ms,
        laggy_frames: BTreeMap::new(),
    };

    for (&frame_id, group) in groups {
        if group.is_empty() {
            continue;
        }

        let mut min_ns = u64::MAX;
        let mut max_ns = u64::MIN;
        for message in group.messages() {
            min_ns = min_ns.min(message.timestamp_sof_ns);
            max_ns = max_ns.max(message.timestamp_sof_ns);
        }

        let spread_ms = (max_ns - min_ns) as f64 / 1e6;
        metrics::histogram!("framelock_frame_spread_ms").record(spread_ms);

        if spread_ms > tolerance_ms {
            let mut timestamps_ms: Vec<(ChannelId, f64)> = group
                .messages()
                .map(|m| (m.channel.clone(), m.timestamp_sof_ms()))
                .collect();
            timestamps_ms.sort_by(|a, b| a.0.cmp(&b.0));

            warn!(frame_id, spread_ms, "frame spread above tolerance");
            report.laggy_frames.insert(
                frame_id,
                SpreadDiagnostic {
                    spread_ms,
                    timestamps_ms,
                },
            );
        }
    }

    report
}
