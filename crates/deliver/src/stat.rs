//! Dispatch throughput counters
//!
//! Single writer (the dispatch loop); snapshot reads from a reporting
//! collaborator tolerate brief staleness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use contracts::ThroughputSnapshot;

const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Cumulative and per-interval dispatch counters
#[derive(Debug)]
pub struct Stat {
    /// Total request copies dispatched (monotonic, process lifetime)
    total: AtomicU64,
    /// Total at the last sample point
    last_total: AtomicU64,
    /// Derived copies-per-second, updated at >= 1s granularity
    per_second: AtomicU64,
    /// Sampling window times
    window: Mutex<SampleWindow>,
}

#[derive(Debug, Clone, Copy)]
struct SampleWindow {
    started_at: Instant,
    last_sample_at: Instant,
}

impl Stat {
    /// Create counters; the window baseline starts now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            total: AtomicU64::new(0),
            last_total: AtomicU64::new(0),
            per_second: AtomicU64::new(0),
            window: Mutex::new(SampleWindow {
                started_at: now,
                last_sample_at: now,
            }),
        }
    }

    /// Reset the window baseline; called when the dispatch loop starts
    pub fn mark_started(&self) {
        let now = Instant::now();
        let mut window = self.lock_window();
        window.started_at = now;
        window.last_sample_at = now;
    }

    /// Count one dispatched request copy
    pub fn record(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Total request copies dispatched
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Last derived per-second rate
    pub fn per_second(&self) -> u64 {
        self.per_second.load(Ordering::Relaxed)
    }

    /// Re-derive the per-second rate if the sample interval has elapsed
    ///
    /// Returns the freshly derived rate, or `None` when the window has not
    /// closed yet.
    pub fn sample(&self, now: Instant) -> Option<u64> {
        let mut window = self.lock_window();
        if now.duration_since(window.last_sample_at) < SAMPLE_INTERVAL {
            return None;
        }

        let total = self.total.load(Ordering::Relaxed);
        let rate = total - self.last_total.load(Ordering::Relaxed);
        self.last_total.store(total, Ordering::Relaxed);
        self.per_second.store(rate, Ordering::Relaxed);
        window.last_sample_at = now;
        Some(rate)
    }

    /// Point-in-time reporting view
    pub fn snapshot(&self) -> ThroughputSnapshot {
        let window = self.lock_window();
        ThroughputSnapshot {
            total_requests: self.total(),
            per_second: self.per_second(),
            elapsed: window.started_at.elapsed(),
        }
    }

    fn lock_window(&self) -> std::sync::MutexGuard<'_, SampleWindow> {
        match self.window.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let stat = Stat::new();
        for _ in 0..100 {
            stat.record();
        }
        assert_eq!(stat.total(), 100);
        assert_eq!(stat.per_second(), 0);
    }

    #[test]
    fn test_sample_before_interval() {
        let stat = Stat::new();
        for _ in 0..100 {
            stat.record();
        }
        // Well under one second since construction
        assert_eq!(stat.sample(Instant::now()), None);
        assert_eq!(stat.per_second(), 0);
        assert_eq!(stat.total(), 100);
    }

    #[test]
    fn test_sample_after_interval() {
        let stat = Stat::new();
        for _ in 0..100 {
            stat.record();
        }

        let later = Instant::now() + Duration::from_millis(1100);
        assert_eq!(stat.sample(later), Some(100));
        assert_eq!(stat.per_second(), 100);

        for _ in 0..40 {
            stat.record();
        }
        let even_later = later + Duration::from_millis(1100);
        assert_eq!(stat.sample(even_later), Some(40));
        assert_eq!(stat.per_second(), 40);
        assert_eq!(stat.total(), 140);
    }

    #[test]
    fn test_snapshot_view() {
        let stat = Stat::new();
        stat.mark_started();
        stat.record();
        stat.record();

        let snapshot = stat.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.per_second, 0);
    }
}
