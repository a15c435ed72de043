//! Capture replay source
//!
//! Replays a recorded capture file (raw concatenation of framed records) as
//! payloads, preserving the original framing bytes on the wire.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use contracts::{Payload, ProtocolKind};
use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::config::ProducerMetrics;
use crate::encoder;
use crate::source::PayloadSource;

/// Capture source configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Source name
    pub name: String,

    /// Capture file to replay
    pub path: PathBuf,

    /// Framing used when the capture was recorded
    pub protocol: ProtocolKind,

    /// Replay rate (payloads per second); 0 = paced by backpressure only
    pub rate_hz: f64,

    /// Restart from the beginning when the file runs out
    pub loop_playback: bool,
}

impl CaptureConfig {
    /// Create a config for the given capture file with defaults
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "capture".to_string(),
            path: path.into(),
            protocol: ProtocolKind::Binary,
            rate_hz: 0.0,
            loop_playback: false,
        }
    }
}

/// Source replaying a recorded capture file
pub struct CaptureSource {
    config: CaptureConfig,
    running: Arc<AtomicBool>,
}

impl CaptureSource {
    /// Create a new capture source
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl PayloadSource for CaptureSource {
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
            let data = match tokio::fs::read(&config.path).await {
                Ok(data) => Bytes::from(data),
                Err(e) => {
                    error!(
                        source = %config.name,
                        path = %config.path.display(),
                        error = %e,
                        "failed to read capture file"
                    );
                    running.store(false, Ordering::SeqCst);
                    return;
                }
            };

            debug!(
                source = %config.name,
                path = %config.path.display(),
                bytes = data.len(),
                "capture replay started"
            );

            if data.is_empty() {
                warn!(source = %config.name, "capture file is empty, nothing to replay");
                running.store(false, Ordering::SeqCst);
                return;
            }

            let interval = if config.rate_hz > 0.0 {
                Some(Duration::from_secs_f64(1.0 / config.rate_hz))
            } else {
                None
            };
            let mut seq: u64 = 0;

            'replay: while running.load(Ordering::Relaxed) {
                let mut offset = 0;

                while offset < data.len() && running.load(Ordering::Relaxed) {
                    let total = match encoder::frame_len(config.protocol, &data[offset..]) {
                        Ok(Some(total)) => total,
                        Ok(None) => {
                            warn!(
                                source = %config.name,
                                offset,
                                "truncated frame at end of capture, stopping"
                            );
                            break 'replay;
                        }
                        Err(e) => {
                            metrics.record_decode_error();
                            error!(source = %config.name, offset, error = %e, "capture decode failed");
                            break 'replay;
                        }
                    };

                    seq += 1;
                    let payload = Payload::new(seq, data.slice(offset..offset + total));
                    offset += total;

                    if tx.send(payload).await.is_err() {
                        debug!(source = %config.name, "ingress closed");
                        break 'replay;
                    }

                    metrics.record_produced();
                    counter!("replicast_payloads_produced_total").increment(1);
                    trace!(source = %config.name, seq, "capture frame replayed");

                    if let Some(interval) = interval {
                        tokio::time::sleep(interval).await;
                    }
                }

                if !config.loop_playback {
                    break;
                }
            }

            running.store(false, Ordering::SeqCst);
            debug!(source = %config.name, replayed = seq, "capture replay stopped");
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
