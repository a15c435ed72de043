//! Synthetic payload source
//!
//! 用于无真实流量环境的压测与测试。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{Payload, ProtocolKind};
use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::ProducerMetrics;
use crate::encoder;
use crate::source::PayloadSource;

/// Synthetic source configuration
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Source name
    pub name: String,

    /// Production rate (payloads per second); 0 = paced by backpressure only
    pub rate_hz: f64,

    /// Payload body size in bytes
    pub payload_size: usize,

    /// Framing applied to each body
    pub protocol: ProtocolKind,

    /// Stop after this many payloads (None = unlimited)
    pub max_payloads: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            name: "synthetic".to_string(),
            rate_hz: 100.0,
            payload_size: 256,
            protocol: ProtocolKind::Binary,
            max_payloads: None,
        }
    }
}

/// Source generating patterned payloads at a fixed rate
pub struct SyntheticSource {
    config: SyntheticConfig,
    running: Arc<AtomicBool>,
}

impl SyntheticSource {
    /// Create a new synthetic source
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl PayloadSource for SyntheticSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn start(&self, tx: mpsc::Sender<Payload>, metrics: Arc<ProducerMetrics>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let interval = if config.rate_hz > 0.0 {
                Some(Duration::from_secs_f64(1.0 / config.rate_hz))
            } else {
                None
            };
            let mut seq: u64 = 0;

            debug!(
                source = %config.name,
                rate_hz = config.rate_hz,
                payload_size = config.payload_size,
                "synthetic source started"
            );

            while running.load(Ordering::Relaxed) {
                seq += 1;

                // Patterned body: repeated low byte of the sequence number
                let body = vec![(seq & 0xff) as u8; config.payload_size];
                let payload = Payload::new(seq, encoder::frame(config.protocol, &body));

                if tx.send(payload).await.is_err() {
                    debug!(source = %config.name, "ingress closed");
                    break;
                }

                metrics.record_produced();
                counter!("replicast_payloads_produced_total").increment(1);
                trace!(source = %config.name, seq, "payload produced");

                if let Some(max) = config.max_payloads {
                    if seq >= max {
                        debug!(source = %config.name, produced = seq, "payload budget reached");
                        break;
                    }
                }

                if let Some(interval) = interval {
                    tokio::time::sleep(interval).await;
                }
            }

            running.store(false, Ordering::SeqCst);
            debug!(source = %config.name, produced = seq, "synthetic source stopped");
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config(max: u64) -> SyntheticConfig {
        SyntheticConfig {
            rate_hz: 0.0,
            payload_size: 16,
            max_payloads: Some(max),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_synthetic_produces_framed_payloads() {
        let source = SyntheticSource::new(fast_config(3));
        let metrics = Arc::new(ProducerMetrics::new());
        let (tx, mut rx) = mpsc::channel(10);

        source.start(tx, metrics.clone());

        for expected_seq in 1..=3u64 {
            let payload = rx.recv().await.unwrap();
            assert_eq!(payload.seq, expected_seq);
            // 4-byte binary header + body
            assert_eq!(payload.len(), 4 + 16);
            assert_eq!(&payload.data[..4], &[0, 0, 0, 16]);
            assert_eq!(payload.data[4], (expected_seq & 0xff) as u8);
        }

        // Budget reached: channel closes and the task winds down
        assert!(rx.recv().await.is_none());
        assert_eq!(metrics.snapshot().payloads_produced, 3);
    }

    #[tokio::test]
    async fn test_synthetic_stop() {
        let source = SyntheticSource::new(SyntheticConfig {
            rate_hz: 1000.0,
            ..Default::default()
        });
        let (tx, mut rx) = mpsc::channel(10);

        source.start(tx, Arc::new(ProducerMetrics::new()));
        assert!(source.is_running());

        let _ = rx.recv().await.unwrap();
        source.stop();
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_synthetic_start_is_idempotent() {
        let source = SyntheticSource::new(fast_config(2));
        let metrics = Arc::new(ProducerMetrics::new());
        let (tx, mut rx) = mpsc::channel(10);

        source.start(tx.clone(), metrics.clone());
        source.start(tx, metrics.clone());

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        // A second start while running must not double production
        assert_eq!(received, 2);
    }
}
