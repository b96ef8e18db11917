//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and
//! traits. All business crates depend only on this crate, reverse
//! dependencies are prohibited.
//!
//! ## Time Model
//! - `timestamp_sof_ns` is the producer-assigned start-of-frame instant in
//!   nanoseconds, not receipt time. It is the primary clock for alignment.
//! - `frame_id` is the producer-assigned frame counter shared across
//!   channels; messages with the same id represent the same instant.

mod blueprint;
mod channel_id;
mod error;
mod message;
mod producer;
mod registry;
mod report;
mod sink;
mod subscription;

pub use blueprint::*;
pub use channel_id::ChannelId;
pub use error::*;
pub use message::*;
pub use producer::{LocalProducerControl, ProducerControl};
pub use registry::FrequencyRegistry;
pub use report::*;
pub use sink::{LocalReportSink, ReportSink};
pub use subscription::{
    FrameBus, FrameSubscription, LocalFrameSubscription, SubscribeOptions,
};
