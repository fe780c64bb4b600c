//! Dispatch counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Total events posted
    posted_count: AtomicU64,
    /// Events rejected by the aggregate mask
    filtered_count: AtomicU64,
    /// Subscriber list lookups performed
    lookup_count: AtomicU64,
    /// Handler invocations that succeeded
    delivered_count: AtomicU64,
    /// Handler invocations that returned an error
    failure_count: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted_count(&self) -> u64 {
        self.posted_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn inc_posted_count(&self) {
        self.posted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn inc_filtered_count(&self) {
        self.filtered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.load(Ordering::Relaxed)
    }

    pub fn inc_lookup_count(&self) {
        self.lookup_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posted_count: self.posted_count(),
            filtered_count: self.filtered_count(),
            lookup_count: self.lookup_count(),
            delivered_count: self.delivered_count(),
            failure_count: self.failure_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub posted_count: u64,
    pub filtered_count: u64,
    pub lookup_count: u64,
    pub delivered_count: u64,
    pub failure_count: u64,
}
