//! # Transport
//!
//! Publish/subscribe plumbing for the monitor.
//!
//! Responsibilities:
//! - In-process loopback bus with bounded per-subscription queues
//! - Non-blocking bounded drains (`FrameSubscription` implementation)
//! - Simulated capture daemon with deterministic fault injection
//!
//! The real wire transport is an external collaborator; deployments bring
//! their own `FrameBus` implementation. The loopback bus here backs the
//! CLI, the demos and the end-to-end tests.
//!
//! ## Usage Example
//!
//! ```ignore
//! use transport::{LoopbackBus, SimCaptureDaemon, SimDaemonConfig};
//! use contracts::{ProducerControl, SubscribeOptions};
//!
//! let bus = LoopbackBus::new(256);
//! let mut daemon = SimCaptureDaemon::new(config, bus.clone());
//! daemon.start().await?;
//! let mut sub = bus.subscribe(&"road_camera".into(), SubscribeOptions::default())?;
//! let batch = sub.drain().await?;
//! daemon.stop().await?;
//! ```

mod error;
mod loopback;
mod sim;
mod stats;

pub use contracts::{FrameBus, FrameMessage, FrameSubscription, SubscribeOptions};
pub use error::{Result, TransportError};
pub use loopback::{LoopbackBus, LoopbackSubscription};
pub use sim::{SimCaptureDaemon, SimDaemonConfig};
pub use stats::{BusMetrics, BusMetricsSnapshot};
