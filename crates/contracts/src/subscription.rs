//! Subscription traits - the consumed pub/sub transport surface.
//!
//! The wire transport itself (channel naming, encoding, conflation
//! mechanics) is an external collaborator; the monitor only requires these
//! two seams. The workspace ships an in-process loopback implementation in
//! the `transport` crate for tests and demos.

use std::time::Duration;

use crate::{ChannelId, FrameMessage, MonitorError};

/// Options for opening one channel subscription
#[derive(Debug, Clone, Copy)]
pub struct SubscribeOptions {
    /// Keep only the newest buffered message per drain
    pub conflate: bool,

    /// Bound on the wait for the first message inside one drain call.
    /// Must be small relative to the collector's poll interval so a silent
    /// channel cannot starve its peers within a tick.
    pub timeout: Duration,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            conflate: false,
            timeout: Duration::from_millis(100),
        }
    }
}

/// One open, non-blocking channel subscription.
///
/// `drain` returns every currently buffered message in arrival order. It
/// waits at most the subscription's configured timeout for the first
/// message and never fails on an empty channel.
#[trait_variant::make(FrameSubscription: Send)]
pub trait LocalFrameSubscription {
    /// Channel this subscription is bound to
    fn channel(&self) -> &ChannelId;

    /// Drain all currently buffered messages
    ///
    /// # Errors
    /// Returns transport errors only; an empty channel yields `Ok(vec![])`.
    async fn drain(&mut self) -> Result<Vec<FrameMessage>, MonitorError>;
}

/// Factory for channel subscriptions.
///
/// Associated-type subscriptions keep the collector generic and
/// monomorphized over the concrete transport.
pub trait FrameBus {
    type Subscription: FrameSubscription;

    /// Open a subscription on `channel`.
    ///
    /// # Errors
    /// Returns `MonitorError::Subscribe` when the transport rejects the
    /// channel.
    fn subscribe(
        &self,
        channel: &ChannelId,
        options: SubscribeOptions,
    ) -> Result<Self::Subscription, MonitorError>;
}
