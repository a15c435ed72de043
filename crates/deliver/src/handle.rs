//! SenderHandle - manages a sender with isolated ingress queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use contracts::{Payload, Transport};

use crate::metrics::SenderMetrics;

/// Handle to a running sender worker
pub struct SenderHandle {
    /// Sender name
    name: String,
    /// Ingress queue into the worker
    tx: mpsc::Sender<Payload>,
    /// Shared metrics
    metrics: Arc<SenderMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SenderHandle {
    /// Create a new SenderHandle and spawn the worker task
    ///
    /// The worker drains the ingress queue until the queue closes or the
    /// cancellation token fires; on cancellation queued payloads are abandoned.
    pub fn spawn<T: Transport + Send + 'static>(
        transport: T,
        queue_capacity: usize,
        token: CancellationToken,
    ) -> Self {
        let name = transport.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SenderMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sender_worker(transport, rx, worker_metrics, token, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get sender name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SenderMetrics> {
        &self.metrics
    }

    /// Get a clone of the ingress queue sender
    pub fn ingress(&self) -> mpsc::Sender<Payload> {
        self.tx.clone()
    }

    /// Send a payload to the sender, waiting while the ingress queue is full
    ///
    /// The wait is the backpressure mechanism: a slow sender throttles its own
    /// feed without blocking other senders. Returns false if the worker is gone.
    pub async fn send(&self, payload: Payload) -> bool {
        match self.tx.send(payload).await {
            Ok(()) => true,
            Err(_) => {
                error!(sender = %self.name, "sender worker closed unexpectedly");
                false
            }
        }
    }

    /// Send a payload without waiting
    ///
    /// Returns true if enqueued, false if the queue was full (payload dropped)
    /// or the worker is gone.
    pub fn try_send(&self, payload: Payload) -> bool {
        match self.tx.try_send(payload) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(payload)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    sender = %self.name,
                    seq = payload.seq,
                    "ingress queue full, payload dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sender = %self.name, "sender worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the sender worker gracefully
    #[instrument(name = "sender_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop the ingress to signal the worker to stop
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sender = %self.name, error = ?e, "worker task panicked");
        }
        debug!(sender = %self.name, "SenderHandle shutdown complete");
    }
}

/// Worker task that consumes payloads and drives the transport
#[instrument(
    name = "sender_worker_loop",
    skip(transport, rx, metrics, token),
    fields(sender = %name)
)]
async fn sender_worker<T: Transport>(
    mut transport: T,
    mut rx: mpsc::Receiver<Payload>,
    metrics: Arc<SenderMetrics>,
    token: CancellationToken,
    name: String,
) {
    debug!(sender = %name, "sender worker started");

    loop {
        // Cancellation wins over queued work; queued payloads are abandoned
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(sender = %name, abandoned = rx.len(), "sender worker cancelled");
                break;
            }
            maybe = rx.recv() => {
                let Some(payload) = maybe else { break };
                metrics.set_queue_len(rx.len());

                match transport.send(&payload).await {
                    Ok(()) => {
                        metrics.inc_write_count();
                    }
                    Err(e) => {
                        metrics.inc_failure_count();
                        error!(
                            sender = %name,
                            seq = payload.seq,
                            error = %e,
                            "send failed"
                        );
                        // At-most-once: keep processing, no retry
                    }
                }
            }
        }
    }

    // Cleanup
    if let Err(e) = transport.flush().await {
        error!(sender = %name, error = %e, "flush failed on shutdown");
    }
    if let Err(e) = transport.close().await {
        error!(sender = %name, error = %e, "close failed on shutdown");
    }

    debug!(sender = %name, "sender worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::ContractError;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, timeout, Duration};

    /// Mock transport for testing
    struct MockTransport {
        name: String,
        sent: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl Transport for MockTransport {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send(&mut self, _payload: &Payload) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sender_write(&self.name, "mock failure"));
            }
            self.sent.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    fn payload(seq: u64) -> Payload {
        Payload::new(seq, Bytes::from_static(b"abcd"))
    }

    #[tokio::test]
    async fn test_sender_handle_basic() {
        let sent = Arc::new(AtomicU64::new(0));
        let transport = MockTransport {
            name: "test".to_string(),
            sent: Arc::clone(&sent),
            should_fail: false,
            delay_ms: 0,
        };

        let handle = SenderHandle::spawn(transport, 10, CancellationToken::new());

        for seq in 0..5 {
            assert!(handle.send(payload(seq)).await);
        }

        handle.shutdown().await;
        assert_eq!(sent.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_sender_handle_queue_full() {
        let sent = Arc::new(AtomicU64::new(0));
        let transport = MockTransport {
            name: "slow".to_string(),
            sent: Arc::clone(&sent),
            should_fail: false,
            delay_ms: 100,
        };

        // Small queue against a slow sender
        let handle = SenderHandle::spawn(transport, 2, CancellationToken::new());

        for seq in 0..10 {
            handle.try_send(payload(seq));
        }

        // Some should have been dropped
        assert!(handle.metrics().dropped_count() > 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sender_handle_failure_isolation() {
        let transport = MockTransport {
            name: "failing".to_string(),
            sent: Arc::new(AtomicU64::new(0)),
            should_fail: true,
            delay_ms: 0,
        };

        let handle = SenderHandle::spawn(transport, 10, CancellationToken::new());

        for seq in 0..3 {
            handle.send(payload(seq)).await;
        }

        // Give worker time to process
        sleep(Duration::from_millis(50)).await;

        // Should have recorded failures without dying
        assert!(handle.metrics().failure_count() > 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sender_worker_cancellation_abandons_queue() {
        let sent = Arc::new(AtomicU64::new(0));
        let transport = MockTransport {
            name: "cancelled".to_string(),
            sent: Arc::clone(&sent),
            should_fail: false,
            delay_ms: 50,
        };

        let token = CancellationToken::new();
        let handle = SenderHandle::spawn(transport, 10, token.clone());

        for seq in 0..10 {
            handle.try_send(payload(seq));
        }

        token.cancel();

        // Worker must exit promptly without draining everything
        timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .expect("worker did not stop after cancellation");
        assert!(sent.load(Ordering::Relaxed) < 10);
    }
}
