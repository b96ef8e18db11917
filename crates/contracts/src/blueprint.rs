//! MonitorBlueprint - Config Loader output
//!
//! Describes one complete monitoring run: the producer under test, the
//! channels it must emit on, capture window shape, validation thresholds,
//! optional simulation faults, and report routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::ChannelId;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete blueprint for one monitoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// The capture daemon under test
    pub producer: ProducerConfig,

    /// Channels the producer must emit on, with nominal frequencies
    pub channels: Vec<ChannelConfig>,

    /// Capture window shape
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Validation thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Fault plan for the simulated daemon (ignored with a real producer)
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Report routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl MonitorBlueprint {
    /// All configured channel identifiers, in declaration order.
    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.channels.iter().map(|c| c.id.clone()).collect()
    }
}

/// Producer process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Daemon name, used for logging and diagnostics
    pub name: String,

    /// Command to launch the real daemon. `None` selects the simulated
    /// daemon.
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed to `command`
    #[serde(default)]
    pub args: Vec<String>,
}

/// One monitored channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name
    pub id: ChannelId,

    /// Nominal frame rate (frames/second)
    pub frequency_hz: f64,
}

/// Capture window shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Observation window length (seconds)
    #[serde(default = "default_window_secs")]
    pub window_secs: f64,

    /// Producer warm-up delay before the window opens (seconds)
    #[serde(default = "default_warm_up_secs")]
    pub warm_up_secs: f64,

    /// Polling cadence of the drain loop (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bound on the per-channel wait inside one drain call (milliseconds).
    /// Must stay small relative to `poll_interval_ms` so every channel is
    /// serviced within one tick.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Keep only the newest buffered message per drain
    #[serde(default)]
    pub conflate: bool,
}

impl CaptureConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs_f64(self.window_secs)
    }

    pub fn warm_up(&self) -> Duration {
        Duration::from_secs_f64(self.warm_up_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            warm_up_secs: default_warm_up_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
            conflate: false,
        }
    }
}

fn default_window_secs() -> f64 {
    30.0
}

fn default_warm_up_secs() -> f64 {
    3.0
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_drain_timeout_ms() -> u64 {
    100
}

/// Validation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Boundary trim rounds applied to the aggregated groups
    #[serde(default = "default_trim_rounds")]
    pub trim_rounds: usize,

    /// Maximum allowed cross-channel timestamp spread per frame (ms)
    #[serde(default = "default_sync_tolerance_ms")]
    pub sync_tolerance_ms: f64,

    /// Allowed fractional deviation from the expected message count
    #[serde(default = "default_freq_margin")]
    pub freq_margin: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            trim_rounds: default_trim_rounds(),
            sync_tolerance_ms: default_sync_tolerance_ms(),
            freq_margin: default_freq_margin(),
        }
    }
}

fn default_trim_rounds() -> usize {
    3
}

fn default_sync_tolerance_ms() -> f64 {
    0.5
}

fn default_freq_margin() -> f64 {
    0.05
}

/// Fault plan for the simulated daemon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// First frame identifier the simulated daemon emits
    #[serde(default = "default_start_frame_id")]
    pub start_frame_id: u64,

    /// Frames to withhold entirely on one channel
    #[serde(default)]
    pub drop_frames: Vec<DropSpec>,

    /// Frames to emit late on one channel
    #[serde(default)]
    pub lag_frames: Vec<LagSpec>,
}

fn default_start_frame_id() -> u64 {
    1
}

/// Withhold one frame on one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropSpec {
    pub channel: ChannelId,
    pub frame_id: u64,
}

/// Shift one frame's start-of-frame timestamp on one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LagSpec {
    pub channel: ChannelId,
    pub frame_id: u64,
    pub offset_ms: f64,
}

/// Report sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name, used for logging and metrics
    pub name: String,

    /// Sink implementation to instantiate
    pub sink_type: SinkType,

    /// Bound on the sink's private queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Implementation-specific parameters (e.g. `dir` for `json_file`)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    16
}

/// Sink implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured tracing summary
    Log,
    /// Pretty-printed JSON file per outcome
    JsonFile,
}
