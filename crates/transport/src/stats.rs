//! Bus traffic counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Loopback bus metrics
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Total messages published
    pub published: AtomicU64,

    /// Total messages dropped at full subscription queues
    pub dropped: AtomicU64,
}

impl BusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the bus counters
#[derive(Debug, Clone, Copy, Default)]
pub struct BusMetricsSnapshot {
    pub published: u64,
    pub dropped: u64,
}
