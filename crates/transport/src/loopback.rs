//! In-process loopback bus.
//!
//! Fan-out pub/sub over bounded `async_channel` queues, one queue per
//! subscription. Publishing never blocks: a full queue drops the newest
//! message for that subscriber and counts the drop.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use contracts::{
    ChannelId, FrameBus, FrameMessage, FrameSubscription, MonitorError, SubscribeOptions,
};
use tracing::{debug, trace, warn};

use crate::error::TransportError;
use crate::stats::BusMetrics;

/// Shared in-process bus. Cloning shares the subscriber registry.
#[derive(Clone)]
pub struct LoopbackBus {
    subscribers: Arc<Mutex<HashMap<ChannelId, Vec<Sender<FrameMessage>>>>>,
    /// When set, subscriptions are restricted to these channels
    topology: Option<Arc<HashSet<ChannelId>>>,
    queue_capacity: usize,
    metrics: Arc<BusMetrics>,
}

impl LoopbackBus {
    /// Create a bus whose subscriptions buffer up to `queue_capacity`
    /// messages each. Any channel name may be subscribed.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            topology: None,
            queue_capacity,
            metrics: Arc::new(BusMetrics::new()),
        }
    }

    /// Create a bus restricted to a fixed channel topology; subscribing
    /// to anything else is rejected. Catches misspelled channel names at
    /// subscribe time instead of as an empty capture.
    pub fn with_channels(queue_capacity: usize, channels: &[ChannelId]) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            topology: Some(Arc::new(channels.iter().cloned().collect())),
            queue_capacity,
            metrics: Arc::new(BusMetrics::new()),
        }
    }

    fn check_topology(&self, channel: &ChannelId) -> Result<(), TransportError> {
        match &self.topology {
            Some(known) if !known.contains(channel) => Err(TransportError::UnknownChannel {
                channel: channel.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Publish one message to every live subscription of its channel.
    pub fn publish(&self, message: FrameMessage) {
        self.metrics.record_published();

        let mut registry = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let Some(queues) = registry.get_mut(message.channel.as_str()) else {
            trace!(channel = %message.channel, "publish on channel without subscribers");
            return;
        };

        queues.retain(|queue| match queue.try_send(message.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                self.metrics.record_dropped();
                metrics::counter!(
                    "framelock_bus_dropped_total",
                    "channel" => dropped.channel.to_string()
                )
                .increment(1);
                warn!(
                    channel = %dropped.channel,
                    frame_id = dropped.frame_id,
                    "subscription queue full, message dropped"
                );
                true
            }
            // Subscription was dropped by its owner
            Err(TrySendError::Closed(_)) => false,
        });
    }

    /// Bus traffic counters, shared across clones.
    pub fn metrics(&self) -> Arc<BusMetrics> {
        self.metrics.clone()
    }

    /// Number of live subscriptions on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(channel)
            .map(|queues| queues.len())
            .unwrap_or(0)
    }
}

impl FrameBus for LoopbackBus {
    type Subscription = LoopbackSubscription;

    fn subscribe(
        &self,
        channel: &ChannelId,
        options: SubscribeOptions,
    ) -> Result<LoopbackSubscription, MonitorError> {
        self.check_topology(channel)
            .map_err(|e| MonitorError::subscribe(channel.as_str(), e.to_string()))?;

        let (tx, rx) = bounded(self.queue_capacity);

        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(channel.clone())
            .or_default()
            .push(tx);

        debug!(channel = %channel, conflate = options.conflate, "subscription opened");
        Ok(LoopbackSubscription {
            channel: channel.clone(),
            rx,
            options,
        })
    }
}

/// One open loopback subscription.
#[derive(Debug)]
pub struct LoopbackSubscription {
    channel: ChannelId,
    rx: Receiver<FrameMessage>,
    options: SubscribeOptions,
}

impl FrameSubscription for LoopbackSubscription {
    fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Drain everything currently buffered, in arrival order.
    ///
    /// Waits at most the configured timeout for the first message, then
    /// empties the queue without further blocking. An idle or closed
    /// channel yields an empty batch, never an error.
    async fn drain(&mut self) -> Result<Vec<FrameMessage>, MonitorError> {
        let mut batch = Vec::new();

        match tokio::time::timeout(self.options.timeout, self.rx.recv()).await {
            Ok(Ok(message)) => batch.push(message),
            Ok(Err(_closed)) => return Ok(batch),
            Err(_elapsed) => return Ok(batch),
        }

        loop {
            match self.rx.try_recv() {
                Ok(message) => batch.push(message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if self.options.conflate && batch.len() > 1 {
            let newest = batch.len() - 1;
            batch.swap(0, newest);
            batch.truncate(1);
        }

        Ok(batch)
    }
}
