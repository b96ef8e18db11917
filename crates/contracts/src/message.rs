//! FrameMessage and FrameGroup - captured traffic and its regrouping.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ChannelId;

/// One message received on a channel during a capture window.
///
/// Frame identifiers are producer-assigned, monotonically increasing and
/// shared across channels; they are not necessarily contiguous over a run.
/// The timestamp is the producer's start-of-frame instant, not receipt time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMessage {
    /// Channel the message was received on
    pub channel: ChannelId,

    /// Producer frame counter shared across channels
    pub frame_id: u64,

    /// Start-of-frame instant, nanoseconds
    pub timestamp_sof_ns: u64,

    /// Opaque encoded frame body (zero-copy)
    pub payload: Bytes,
}

impl FrameMessage {
    /// Start-of-frame instant in milliseconds, for diagnostics.
    #[inline]
    pub fn timestamp_sof_ms(&self) -> f64 {
        self.timestamp_sof_ns as f64 / 1e6
    }
}

/// All captures sharing one frame identifier, at most one per channel.
///
/// Built once by the aggregator and immutable afterwards. A channel that
/// produced nothing for the identifier is simply absent; that absence is
/// what the skip check detects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameGroup {
    entries: HashMap<ChannelId, FrameMessage>,

    /// Messages discarded because their channel was already present.
    duplicates: u32,
}

impl FrameGroup {
    /// Insert a capture for its channel. The first message per channel wins;
    /// later ones are counted as duplicates and dropped.
    pub fn insert(&mut self, message: FrameMessage) {
        if self.entries.contains_key(message.channel.as_str()) {
            self.duplicates += 1;
        } else {
            self.entries.insert(message.channel.clone(), message);
        }
    }

    /// Capture for one channel, if present.
    pub fn get(&self, channel: &str) -> Option<&FrameMessage> {
        self.entries.get(channel)
    }

    /// Whether the group holds a capture for `channel`.
    pub fn contains(&self, channel: &str) -> bool {
        self.entries.contains_key(channel)
    }

    /// Channels present in this group.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelId> {
        self.entries.keys()
    }

    /// All captures in the group, in no particular order.
    pub fn messages(&self) -> impl Iterator<Item = &FrameMessage> {
        self.entries.values()
    }

    /// Number of channels captured for this identifier.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no channel captured this identifier.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of same-channel duplicates discarded on insert.
    pub fn duplicate_count(&self) -> u32 {
        self.duplicates
    }
}
