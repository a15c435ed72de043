//! PayloadSource trait - payload producer abstraction

use std::sync::Arc;

use contracts::Payload;
use tokio::sync::mpsc;

use crate::config::ProducerMetrics;

/// Payload producer trait
///
/// Abstracts the common behavior of synthetic generators and capture
/// replayers so the orchestrator can drive either through one interface.
/// `start` spawns the production task; production ends when `stop` is called,
/// the ingress channel closes, or the source runs out of payloads.
pub trait PayloadSource: Send + Sync {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Start producing into the ingress channel
    ///
    /// Repeated calls while running are idempotent.
    fn start(&self, tx: mpsc::Sender<Payload>, metrics: Arc<ProducerMetrics>);

    /// Stop producing
    fn stop(&self);

    /// Check whether the production task is active
    fn is_running(&self) -> bool;
}
