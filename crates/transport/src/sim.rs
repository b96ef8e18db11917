//! Simulated capture daemon.
//!
//! Publishes lock-step frames on every configured channel at a common
//! cadence, with deterministic fault injection for exercising the monitor:
//! dropping one (channel, frame) entirely, or shifting its start-of-frame
//! timestamp.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use contracts::{
    ChannelId, FrameMessage, MonitorBlueprint, MonitorError, ProducerControl,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::loopback::LoopbackBus;

const SIM_PAYLOAD: &[u8] = b"simulated-frame";

/// Simulated daemon configuration
#[derive(Debug, Clone)]
pub struct SimDaemonConfig {
    /// Daemon name, for logging
    pub name: String,

    /// Channels to emit on
    pub channels: Vec<ChannelId>,

    /// Common lock-step cadence (frames/second)
    pub frequency_hz: f64,

    /// First frame identifier emitted
    pub start_frame_id: u64,

    /// (channel, frame_id) pairs withheld entirely
    pub drop_frames: HashSet<(ChannelId, u64)>,

    /// (channel, frame_id) -> start-of-frame shift in milliseconds
    pub lag_frames: HashMap<(ChannelId, u64), f64>,
}

impl SimDaemonConfig {
    /// Derive the simulation from a blueprint.
    ///
    /// Channels of a simulated rig share one cadence; the first channel's
    /// nominal frequency is taken as the common rate and a mismatch is
    /// logged.
    pub fn from_blueprint(blueprint: &MonitorBlueprint) -> Self {
        let frequency_hz = blueprint
            .channels
            .first()
            .map(|c| c.frequency_hz)
            .unwrap_or(20.0);

        if blueprint
            .channels
            .iter()
            .any(|c| c.frequency_hz != frequency_hz)
        {
            warn!(
                common_hz = frequency_hz,
                "channels declare differing rates, simulation emits lock-step at the first channel's rate"
            );
        }

        Self {
            name: blueprint.producer.name.clone(),
            channels: blueprint.channel_ids(),
            frequency_hz,
            start_frame_id: blueprint.simulation.start_frame_id,
            drop_frames: blueprint
                .simulation
                .drop_frames
                .iter()
                .map(|s| (s.channel.clone(), s.frame_id))
                .collect(),
            lag_frames: blueprint
                .simulation
                .lag_frames
                .iter()
                .map(|s| ((s.channel.clone(), s.frame_id), s.offset_ms))
                .collect(),
        }
    }
}

/// Simulated capture daemon publishing onto a loopback bus.
pub struct SimCaptureDaemon {
    config: SimDaemonConfig,
    bus: LoopbackBus,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl SimCaptureDaemon {
    pub fn new(config: SimDaemonConfig, bus: LoopbackBus) -> Self {
        Self {
            config,
            bus,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    fn emit_tick(
        config: &SimDaemonConfig,
        bus: &LoopbackBus,
        frame_id: u64,
        base_timestamp_ns: u64,
        period_ns: u64,
    ) {
        let nominal_ns =
            base_timestamp_ns + (frame_id - config.start_frame_id) * period_ns;

        for channel in &config.channels {
            let key = (channel.clone(), frame_id);
            if config.drop_frames.contains(&key) {
                debug!(channel = %channel, frame_id, "fault plan: frame withheld");
                continue;
            }

            let mut timestamp_sof_ns = nominal_ns;
            if let Some(offset_ms) = config.lag_frames.get(&key) {
                timestamp_sof_ns =
                    (timestamp_sof_ns as f64 + offset_ms * 1e6).round() as u64;
                debug!(channel = %channel, frame_id, offset_ms, "fault plan: frame lagged");
            }

            bus.publish(FrameMessage {
                channel: channel.clone(),
                frame_id,
                timestamp_sof_ns,
                payload: Bytes::from_static(SIM_PAYLOAD),
            });
        }
    }
}

impl ProducerControl for SimCaptureDaemon {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn is_available(&self) -> bool {
        // Simulation has no environment requirements.
        true
    }

    async fn start(&mut self) -> Result<(), MonitorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::producer_spawn(
                &self.config.name,
                "simulated daemon already running",
            ));
        }

        let config = self.config.clone();
        let bus = self.bus.clone();
        let running = self.running.clone();

        self.task = Some(tokio::spawn(async move {
            let period = Duration::from_secs_f64(1.0 / config.frequency_hz);
            let period_ns = period.as_nanos() as u64;
            let base_timestamp_ns = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            let mut frame_id = config.start_frame_id;
            let mut cadence = tokio::time::interval(period);

            debug!(
                name = %config.name,
                channels = config.channels.len(),
                frequency_hz = config.frequency_hz,
                "simulated daemon started"
            );

            while running.load(Ordering::Relaxed) {
                cadence.tick().await;
                Self::emit_tick(&config, &bus, frame_id, base_timestamp_ns, period_ns);
                frame_id += 1;
            }

            debug!(name = %config.name, last_frame_id = frame_id, "simulated daemon stopped");
        }));

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), MonitorError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                return Err(MonitorError::producer_stop(
                    &self.config.name,
                    e.to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FrameBus, FrameSubscription, SubscribeOptions};
    use std::time::Duration;

    fn config(channels: &[&str], frequency_hz: f64) -> SimDaemonConfig {
        SimDaemonConfig {
            name: "sim_camerad".into(),
            channels: channels.iter().map(|c| ChannelId::from(*c)).collect(),
            frequency_hz,
            start_frame_id: 1,
            drop_frames: HashSet::new(),
            lag_frames: HashMap::new(),
        }
    }

    fn options() -> SubscribeOptions {
        SubscribeOptions {
            conflate: false,
            timeout: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_lock_step_emission() {
        let bus = LoopbackBus::new(256);
        let mut road = bus.subscribe(&"road_camera".into(), options()).unwrap();
        let mut driver = bus.subscribe(&"driver_camera".into(), options()).unwrap();

        let mut daemon =
            SimCaptureDaemon::new(config(&["road_camera", "driver_camera"], 200.0), bus);
        daemon.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        daemon.stop().await.unwrap();

        let road_batch = road.drain().await.unwrap();
        let driver_batch = driver.drain().await.unwrap();
        assert!(!road_batch.is_empty());
        assert_eq!(road_batch.len(), driver_batch.len());

        // Same frame id must carry the same start-of-frame instant on
        // every channel.
        for (a, b) in road_batch.iter().zip(driver_batch.iter()) {
            assert_eq!(a.frame_id, b.frame_id);
            assert_eq!(a.timestamp_sof_ns, b.timestamp_sof_ns);
        }
    }

    #[tokio::test]
    async fn test_drop_fault_withholds_single_frame() {
        let bus = LoopbackBus::new(256);
        let mut sub = bus.subscribe(&"road_camera".into(), options()).unwrap();

        let mut cfg = config(&["road_camera"], 500.0);
        cfg.drop_frames.insert(("road_camera".into(), 3));

        let mut daemon = SimCaptureDaemon::new(cfg, bus);
        daemon.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        daemon.stop().await.unwrap();

        let ids: Vec<_> = sub
            .drain()
            .await
            .unwrap()
            .iter()
            .map(|m| m.frame_id)
            .collect();
        assert!(!ids.contains(&3));
        assert!(ids.contains(&2));
        assert!(ids.contains(&4));
    }

    #[tokio::test]
    async fn test_lag_fault_shifts_timestamp() {
        let bus = LoopbackBus::new(256);
        let mut road = bus.subscribe(&"road_camera".into(), options()).unwrap();
        let mut driver = bus.subscribe(&"driver_camera".into(), options()).unwrap();

        let mut cfg = config(&["road_camera", "driver_camera"], 500.0);
        cfg.lag_frames.insert(("driver_camera".into(), 2), 1.0);

        let mut daemon = SimCaptureDaemon::new(cfg, bus);
        daemon.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        daemon.stop().await.unwrap();

        let road_ts: HashMap<u64, u64> = road
            .drain()
            .await
            .unwrap()
            .iter()
            .map(|m| (m.frame_id, m.timestamp_sof_ns))
            .collect();
        let driver_ts: HashMap<u64, u64> = driver
            .drain()
            .await
            .unwrap()
            .iter()
            .map(|m| (m.frame_id, m.timestamp_sof_ns))
            .collect();

        // Frame 2 is shifted by exactly 1 ms, its neighbors agree.
        assert_eq!(driver_ts[&2] - road_ts[&2], 1_000_000);
        assert_eq!(driver_ts[&1], road_ts[&1]);
        assert_eq!(driver_ts[&3], road_ts[&3]);
    }

    #[tokio::test]
    async fn test_drop_fault_at_random_position() {
        use rand::Rng;

        let target = rand::rng().random_range(2u64..10);
        let bus = LoopbackBus::new(256);
        let mut sub = bus.subscribe(&"road_camera".into(), options()).unwrap();

        let mut cfg = config(&["road_camera"], 500.0);
        cfg.drop_frames.insert(("road_camera".into(), target));

        let mut daemon = SimCaptureDaemon::new(cfg, bus);
        daemon.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        daemon.stop().await.unwrap();

        let ids: Vec<_> = sub
            .drain()
            .await
            .unwrap()
            .iter()
            .map(|m| m.frame_id)
            .collect();
        assert!(!ids.contains(&target), "frame {target} should be withheld");
        assert!(ids.contains(&(target - 1)));
        assert!(ids.contains(&(target + 1)));
    }
}
