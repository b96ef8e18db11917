//! Frame aggregation and edge trimming.
//!
//! Regroups every captured message, across all channels, by its frame
//! identifier, then strips the boundary identifiers that warm-up/cooldown
//! truncation leaves partially populated.

use std::collections::{BTreeMap, HashMap};

use contracts::{ChannelId, FrameGroup, MonitorError};
use tracing::{debug, instrument};

use crate::buffer::ChannelBuffer;

/// Regroup all buffered messages by frame identifier.
///
/// Insertion is keyed and commutative, so traversal order is irrelevant.
/// Sparse groups (identifiers some channel never produced) are recorded as
/// they are; completeness is judged later by the skip check.
#[instrument(name = "aggregate_groups", skip_all, fields(channels = buffers.len()))]
pub fn group_by_frame_id(
    buffers: &HashMap<ChannelId, ChannelBuffer>,
) -> BTreeMap<u64, FrameGroup> {
    let mut groups: BTreeMap<u64, FrameGroup> = BTreeMap::new();

    for buffer in buffers.values() {
        for message in buffer.iter() {
            groups
                .entry(message.frame_id)
                .or_default()
                .insert(message.clone());
        }
    }

    debug!(groups = groups.len(), "aggregated frame groups");
    groups
}

/// Strip boundary identifiers: `rounds` times, remove the current minimum
/// and maximum frame identifier.
///
/// # Errors
/// `MonitorError::InsufficientFrames` when fewer than `2 * rounds + 1`
/// distinct identifiers were captured. That is a precondition on window
/// length versus nominal frequency, not a recoverable condition; it is
/// reported before any group-based validator executes.
#[instrument(name = "trim_edges", skip(groups), fields(groups = groups.len(), rounds))]
pub fn trim_edges(
    groups: &mut BTreeMap<u64, FrameGroup>,
    rounds: usize,
) -> Result<(), MonitorError> {
    let required = 2 * rounds + 1;
    if groups.len() < required {
        return Err(MonitorError::InsufficientFrames {
            distinct: groups.len(),
            required,
        });
    }

    for _ in 0..rounds {
        groups.pop_first();
        groups.pop_last();
    }

    debug!(remaining = groups.len(), "boundary identifiers trimmed");
    Ok(())
}
