//! Producer metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Producer metrics
#[derive(Debug, Default)]
pub struct ProducerMetrics {
    /// Total payloads pushed into the ingress
    pub payloads_produced: AtomicU64,

    /// Total capture frames that failed to decode
    pub decode_errors: AtomicU64,
}

impl ProducerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record payload produced
    pub fn record_produced(&self) {
        self.payloads_produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record decode error
    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> ProducerMetricsSnapshot {
        ProducerMetricsSnapshot {
            payloads_produced: self.payloads_produced.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct ProducerMetricsSnapshot {
    /// Total payloads pushed into the ingress
    pub payloads_produced: u64,

    /// Total capture frames that failed to decode
    pub decode_errors: u64,
}
