//! Stream collector - one subscription and one buffer per channel.

use std::collections::HashMap;

use contracts::{
    CaptureConfig, ChannelId, FrameBus, FrameSubscription, FrequencyRegistry, MonitorError,
    SubscribeOptions,
};
use tracing::{debug, instrument, trace};

use crate::buffer::ChannelBuffer;

/// Buffers never shrink below this, whatever the nominal rate says.
const MIN_BUFFER_CAPACITY: usize = 64;

/// Headroom over the expected window traffic, so that warm-up spill and
/// rate overshoot never hit the capacity drop path.
const CAPACITY_HEADROOM: f64 = 1.5;

struct Lane<S> {
    subscription: S,
    buffer: ChannelBuffer,
}

/// Owns one non-blocking subscription and one append-only buffer per
/// configured channel. Buffers are disjoint per channel, so the drain loop
/// needs no locking anywhere.
pub struct StreamCollector<S: FrameSubscription> {
    lanes: Vec<Lane<S>>,
}

impl<S: FrameSubscription> StreamCollector<S> {
    /// Subscribe every channel and allocate its buffer.
    ///
    /// Buffer capacity is sized from the channel's nominal rate over the
    /// window plus headroom.
    #[instrument(name = "collector_open", skip_all, fields(channels = channels.len()))]
    pub fn open<B>(
        bus: &B,
        channels: &[ChannelId],
        registry: &FrequencyRegistry,
        capture: &CaptureConfig,
    ) -> Result<Self, MonitorError>
    where
        B: FrameBus<Subscription = S>,
    {
        let options = SubscribeOptions {
            conflate: capture.conflate,
            timeout: capture.drain_timeout(),
        };

        let mut lanes = Vec::with_capacity(channels.len());
        for channel in channels {
            let subscription = bus.subscribe(channel, options)?;
            let capacity = Self::buffer_capacity(registry, channel, capture.window_secs);
            debug!(channel = %channel, capacity, "channel lane opened");
            lanes.push(Lane {
                subscription,
                buffer: ChannelBuffer::with_capacity(capacity),
            });
        }

        Ok(Self { lanes })
    }

    fn buffer_capacity(
        registry: &FrequencyRegistry,
        channel: &ChannelId,
        window_secs: f64,
    ) -> usize {
        let expected = registry
            .expected_frames(channel, window_secs)
            .unwrap_or_default();
        ((expected * CAPACITY_HEADROOM).ceil() as usize).max(MIN_BUFFER_CAPACITY)
    }

    /// Drain every channel once, in subscription order, appending to the
    /// per-channel buffers. Returns the number of messages moved this tick.
    ///
    /// Each drain is bounded by the subscription's timeout, so a silent
    /// channel cannot stall its peers beyond that bound.
    pub async fn drain_all(&mut self) -> Result<usize, MonitorError> {
        let mut moved = 0;
        for lane in &mut self.lanes {
            let batch = lane.subscription.drain().await?;
            if !batch.is_empty() {
                trace!(
                    channel = %lane.subscription.channel(),
                    messages = batch.len(),
                    "drained"
                );
                metrics::counter!(
                    "framelock_messages_drained_total",
                    "channel" => lane.subscription.channel().to_string()
                )
                .increment(batch.len() as u64);
            }
            moved += batch.len();
            for message in batch {
                lane.buffer.push(message);
            }
        }
        Ok(moved)
    }

    /// Number of channel lanes.
    pub fn channel_count(&self) -> usize {
        self.lanes.len()
    }

    /// Freeze the capture: give up the subscriptions and hand the buffers
    /// to validation.
    pub fn freeze(self) -> HashMap<ChannelId, ChannelBuffer> {
        self.lanes
            .into_iter()
            .map(|lane| {
                metrics::gauge!(
                    "framelock_buffer_depth",
                    "channel" => lane.subscription.channel().to_string()
                )
                .set(lane.buffer.len() as f64);
                (lane.subscription.channel().clone(), lane.buffer)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{ChannelConfig, FrameMessage};
    use std::time::Duration;
    use transport::LoopbackBus;

    fn capture_config() -> CaptureConfig {
        CaptureConfig {
            window_secs: 1.0,
            warm_up_secs: 0.0,
            poll_interval_ms: 50,
            drain_timeout_ms: 10,
            conflate: false,
        }
    }

    fn registry() -> FrequencyRegistry {
        FrequencyRegistry::from_channels(&[
            ChannelConfig {
                id: "road_camera".into(),
                frequency_hz: 20.0,
            },
            ChannelConfig {
                id: "driver_camera".into(),
                frequency_hz: 20.0,
            },
        ])
    }

    fn msg(channel: &str, frame_id: u64) -> FrameMessage {
        FrameMessage {
            channel: channel.into(),
            frame_id,
            timestamp_sof_ns: frame_id * 50_000_000,
            payload: Bytes::new(),
        }
    }

    #[tokio::test]
    async fn test_drain_all_routes_per_channel() {
        let bus = LoopbackBus::new(64);
        let channels: Vec<ChannelId> = vec!["road_camera".into(), "driver_camera".into()];
        let mut collector =
            StreamCollector::open(&bus, &channels, &registry(), &capture_config()).unwrap();
        assert_eq!(collector.channel_count(), 2);

        bus.publish(msg("road_camera", 1));
        bus.publish(msg("road_camera", 2));
        bus.publish(msg("driver_camera", 1));

        let moved = collector.drain_all().await.unwrap();
        assert_eq!(moved, 3);

        let buffers = collector.freeze();
        assert_eq!(buffers["road_camera"].len(), 2);
        assert_eq!(buffers["driver_camera"].len(), 1);
    }

    #[tokio::test]
    async fn test_silent_channel_does_not_block_peers() {
        let bus = LoopbackBus::new(64);
        let channels: Vec<ChannelId> = vec!["road_camera".into(), "driver_camera".into()];
        let mut collector =
            StreamCollector::open(&bus, &channels, &registry(), &capture_config()).unwrap();

        // Only one channel has traffic; the drain must still complete
        // promptly and deliver it.
        bus.publish(msg("driver_camera", 1));

        let started = std::time::Instant::now();
        let moved = collector.drain_all().await.unwrap();
        assert_eq!(moved, 1);
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_repeated_drains_accumulate() {
        let bus = LoopbackBus::new(64);
        let channels: Vec<ChannelId> = vec!["road_camera".into()];
        let mut collector =
            StreamCollector::open(&bus, &channels, &registry(), &capture_config()).unwrap();

        bus.publish(msg("road_camera", 1));
        collector.drain_all().await.unwrap();
        bus.publish(msg("road_camera", 2));
        collector.drain_all().await.unwrap();

        let buffers = collector.freeze();
        let ids: Vec<_> = buffers["road_camera"].frame_ids().collect();
        assert_eq!(ids, [1, 2]);
    }
}
