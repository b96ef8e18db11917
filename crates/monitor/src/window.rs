//! Capture window controller.
//!
//! Drives one observation window: start the producer, let it warm up,
//! poll-drain every channel on a fixed cadence for the window duration,
//! then stop the producer. The stop is unconditional: capture failures
//! propagate only after the guard has released the daemon.

use std::collections::HashMap;
use std::time::Instant;

use contracts::{
    CaptureConfig, ChannelId, FrameBus, FrequencyRegistry, MonitorError, ProducerControl,
};
use producer::ProducerGuard;
use tracing::{debug, info, instrument};

use crate::buffer::ChannelBuffer;
use crate::collector::StreamCollector;

/// One observation window over a running producer.
pub struct CaptureWindow {
    config: CaptureConfig,
}

impl CaptureWindow {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Run the window and return the frozen per-channel buffers.
    ///
    /// The producer is acquired first and released exactly once on every
    /// exit path; a capture error surfaces only after the release, and a
    /// release error on an otherwise clean capture surfaces as the run
    /// error.
    #[instrument(name = "capture_window_run", skip_all, fields(window_secs = self.config.window_secs))]
    pub async fn run<P, B>(
        &self,
        producer: P,
        bus: &B,
        channels: &[ChannelId],
        registry: &FrequencyRegistry,
    ) -> Result<HashMap<ChannelId, ChannelBuffer>, MonitorError>
    where
        P: ProducerControl,
        B: FrameBus,
    {
        let guard = ProducerGuard::start(producer).await?;
        let captured = self.capture(bus, channels, registry).await;
        let stopped = guard.stop().await;

        let buffers = captured?;
        stopped?;
        Ok(buffers)
    }

    /// Warm-up sleep, then the poll/drain loop.
    ///
    /// Subscriptions open after warm-up so the buffers hold window traffic
    /// only, not start-up spill.
    async fn capture<B>(
        &self,
        bus: &B,
        channels: &[ChannelId],
        registry: &FrequencyRegistry,
    ) -> Result<HashMap<ChannelId, ChannelBuffer>, MonitorError>
    where
        B: FrameBus,
    {
        debug!(
            warm_up_secs = self.config.warm_up_secs,
            "waiting for producer to reach steady state"
        );
        tokio::time::sleep(self.config.warm_up()).await;

        let mut collector = StreamCollector::open(bus, channels, registry, &self.config)?;

        let window = self.config.window();
        let poll_interval = self.config.poll_interval();
        let started = Instant::now();
        let mut total = 0usize;
        let mut ticks = 0u64;

        while started.elapsed() < window {
            total += collector.drain_all().await?;
            ticks += 1;
            tokio::time::sleep(poll_interval).await;
        }

        // One final sweep so messages published during the last sleep are
        // not lost to the window boundary.
        total += collector.drain_all().await?;

        info!(
            messages = total,
            ticks,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "capture window closed"
        );

        Ok(collector.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ChannelConfig, FrameSubscription, SubscribeOptions};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use transport::{LoopbackBus, SimCaptureDaemon, SimDaemonConfig};

    fn fast_capture() -> CaptureConfig {
        CaptureConfig {
            window_secs: 0.3,
            warm_up_secs: 0.05,
            poll_interval_ms: 25,
            drain_timeout_ms: 5,
            conflate: false,
        }
    }

    fn registry(channels: &[&str], hz: f64) -> FrequencyRegistry {
        let configs: Vec<ChannelConfig> = channels
            .iter()
            .map(|c| ChannelConfig {
                id: (*c).into(),
                frequency_hz: hz,
            })
            .collect();
        FrequencyRegistry::from_channels(&configs)
    }

    fn sim_config(channels: &[&str], hz: f64) -> SimDaemonConfig {
        SimDaemonConfig {
            name: "sim_camerad".into(),
            channels: channels.iter().map(|c| (*c).into()).collect(),
            frequency_hz: hz,
            start_frame_id: 1,
            drop_frames: Default::default(),
            lag_frames: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_window_populates_every_channel() {
        let bus = LoopbackBus::new(1024);
        let names = ["road_camera", "driver_camera"];
        let daemon = SimCaptureDaemon::new(sim_config(&names, 100.0), bus.clone());
        let channels: Vec<ChannelId> = names.iter().map(|c| (*c).into()).collect();

        let window = CaptureWindow::new(fast_capture());
        let buffers = window
            .run(daemon, &bus, &channels, &registry(&names, 100.0))
            .await
            .unwrap();

        assert_eq!(buffers.len(), 2);
        for name in names {
            assert!(
                buffers[name].len() > 10,
                "expected steady traffic on {name}, got {}",
                buffers[name].len()
            );
        }
    }

    /// Bus whose subscribe always fails, to force a capture error after
    /// the producer started.
    struct RefusingBus;

    struct NeverSubscription;

    impl FrameSubscription for NeverSubscription {
        fn channel(&self) -> &ChannelId {
            unreachable!("never constructed")
        }

        async fn drain(&mut self) -> Result<Vec<contracts::FrameMessage>, MonitorError> {
            Ok(vec![])
        }
    }

    impl FrameBus for RefusingBus {
        type Subscription = NeverSubscription;

        fn subscribe(
            &self,
            channel: &ChannelId,
            _options: SubscribeOptions,
        ) -> Result<Self::Subscription, MonitorError> {
            Err(MonitorError::subscribe(channel.as_str(), "bus refused"))
        }
    }

    struct CountingProducer {
        starts: Arc<AtomicU32>,
        stops: Arc<AtomicU32>,
    }

    impl ProducerControl for CountingProducer {
        fn name(&self) -> &str {
            "counting"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn start(&mut self) -> Result<(), MonitorError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), MonitorError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_producer_stopped_even_when_capture_fails() {
        let starts = Arc::new(AtomicU32::new(0));
        let stops = Arc::new(AtomicU32::new(0));
        let producer = CountingProducer {
            starts: starts.clone(),
            stops: stops.clone(),
        };

        let mut config = fast_capture();
        config.warm_up_secs = 0.0;
        let window = CaptureWindow::new(config);
        let channels: Vec<ChannelId> = vec!["road_camera".into()];

        let result = window
            .run(
                producer,
                &RefusingBus,
                &channels,
                &registry(&["road_camera"], 100.0),
            )
            .await;

        assert!(matches!(result, Err(MonitorError::Subscribe { .. })));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
