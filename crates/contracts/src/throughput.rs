//! Throughput snapshot - the reporting view of the dispatch counters

use std::time::Duration;

/// Point-in-time view of the dispatch counters
///
/// Readers may observe a snapshot slightly behind the live counters; the
/// totals are monotonic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThroughputSnapshot {
    /// Total request copies dispatched since start
    pub total_requests: u64,

    /// Request copies per second, derived at >= 1s granularity
    pub per_second: u64,

    /// Time since the dispatch loop started
    pub elapsed: Duration,
}
