//! Per-channel capture buffer.
//!
//! Uses index-based separation for better performance:
//! - HeapRb stores lightweight metadata (frame id + timestamp + slab key)
//! - Slab stores the actual FrameMessage payloads
//!
//! Appends therefore never move frame payloads. The buffer is owned
//! exclusively by the collector while a window is open and frozen (read
//! only) once the producer stops.

use std::fmt;

use contracts::FrameMessage;
use ringbuf::{traits::*, HeapRb};
use slab::Slab;

/// Lightweight metadata stored in the ring buffer
#[derive(Debug, Clone, Copy)]
struct FrameMeta {
    frame_id: u64,
    /// Key into the slab storage
    slab_key: usize,
}

/// Append-ordered bounded buffer of one channel's captured messages.
///
/// When full, the oldest message is overwritten and counted; a counted
/// drop corrupts the frequency check's input, so the collector sizes the
/// buffer with headroom over the expected window traffic. Frame-id
/// regressions (a message whose id is below its predecessor's) are counted
/// but kept.
pub struct ChannelBuffer {
    index: HeapRb<FrameMeta>,
    storage: Slab<FrameMessage>,
    capacity: usize,
    dropped_count: u64,
    regression_count: u64,
    last_frame_id: Option<u64>,
}

impl fmt::Debug for ChannelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBuffer")
            .field("len", &self.index.occupied_len())
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped_count)
            .field("regressions", &self.regression_count)
            .finish()
    }
}

impl ChannelBuffer {
    /// Create a buffer holding at most `capacity` messages.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HeapRb::new(capacity),
            storage: Slab::with_capacity(capacity),
            capacity,
            dropped_count: 0,
            regression_count: 0,
            last_frame_id: None,
        }
    }

    /// Append one message in arrival order.
    #[inline]
    pub fn push(&mut self, message: FrameMessage) {
        let frame_id = message.frame_id;

        if let Some(last) = self.last_frame_id {
            if frame_id < last {
                self.regression_count += 1;
            }
        }
        self.last_frame_id = Some(frame_id);

        if self.index.is_full() {
            if let Some(old_meta) = self.index.try_pop() {
                self.storage.remove(old_meta.slab_key);
            }
            self.dropped_count += 1;
        }

        let slab_key = self.storage.insert(message);
        let _ = self.index.try_push(FrameMeta { frame_id, slab_key });
    }

    /// Messages in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &FrameMessage> {
        self.index
            .iter()
            .filter_map(|meta| self.storage.get(meta.slab_key))
    }

    /// Frame identifiers in arrival order.
    pub fn frame_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.index.iter().map(|meta| meta.frame_id)
    }

    /// Number of buffered messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Messages overwritten because the buffer was full.
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    /// Frame-id regressions observed while appending.
    #[inline]
    pub fn regression_count(&self) -> u64 {
        self.regression_count
    }
}
