//! Session statistics.

use std::time::Duration;

use observability::ThroughputAggregator;

/// Statistics from a replication session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Total payloads produced into the ingress
    pub payloads_produced: u64,

    /// Total request copies dispatched across the pool
    pub requests_dispatched: u64,

    /// Clients that survived pool construction
    pub pool_size: usize,

    /// Successful sender writes
    pub sender_writes: u64,

    /// Failed sender writes
    pub sender_failures: u64,

    /// Payload copies dropped at sender ingresses
    pub sender_dropped: u64,

    /// Total duration of the session
    pub duration: Duration,

    /// Throughput sample aggregator
    pub throughput: ThroughputAggregator,
}

impl SessionStats {
    /// Calculate average dispatched requests per second over the whole run
    pub fn rps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.requests_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Session Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Payloads produced: {}", self.payloads_produced);
        println!("   ├─ Requests dispatched: {}", self.requests_dispatched);
        println!("   ├─ Average rate: {:.2} req/s", self.rps());
        println!("   └─ Pool size: {}", self.pool_size);

        let summary = self.throughput.summary();

        println!("\n📈 Senders");
        println!("   ├─ Writes: {}", self.sender_writes);
        println!("   ├─ Failures: {}", self.sender_failures);
        println!("   ├─ Dropped: {}", self.sender_dropped);
        println!("   └─ Sampled rate (req/s): {}", summary.rate);

        println!();
    }
}
