//! Deliver - main loop cloning inbound payloads across the client pool

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use contracts::{DeliverMode, Payload, ReplayPlan};

use crate::client::{Client, ClientConfig};
use crate::error::DeliverError;
use crate::metrics::SenderMetricsSnapshot;
use crate::stat::Stat;

/// Deliver configuration, immutable after construction
#[derive(Debug, Clone)]
pub struct DeliverConfig {
    /// Remote target, `host:port`
    pub remote_addr: String,

    /// Long-lived vs per-request connections
    pub long_lived: bool,

    /// Client pool size
    pub concurrency: usize,

    /// Additional duplicate sends per inbound payload (0 = send once)
    pub clone: usize,

    /// Capacity of the inbound queue and each sender's ingress queue
    pub queue_capacity: usize,

    /// Operating mode
    pub mode: DeliverMode,

    /// Directory for the local capture fallback
    pub fallback_dir: PathBuf,
}

impl DeliverConfig {
    /// Build the runtime configuration from a loaded plan
    pub fn from_plan(plan: &ReplayPlan) -> Self {
        Self {
            remote_addr: plan.target.addr.clone(),
            long_lived: plan.target.long_lived,
            concurrency: plan.delivery.concurrency,
            clone: plan.delivery.clone,
            queue_capacity: plan.delivery.queue_capacity,
            mode: plan.delivery.mode,
            fallback_dir: plan.target.fallback_dir.clone(),
        }
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            remote_addr: self.remote_addr.clone(),
            long_lived: self.long_lived,
            queue_capacity: self.queue_capacity,
            fallback_dir: self.fallback_dir.clone(),
        }
    }
}

/// Final report returned when the run stops
#[derive(Debug, Clone)]
pub struct DeliverReport {
    /// Clients that survived pool construction
    pub pool_size: usize,

    /// Dispatch counters at shutdown
    pub stat: contracts::ThroughputSnapshot,

    /// Per-sender metrics at shutdown
    pub senders: Vec<(String, SenderMetricsSnapshot)>,
}

/// The traffic-replication dispatcher
///
/// Owns the client pool, the inbound payload queue, the dispatch loop and the
/// cancellation context governing the subsystem's lifetime.
pub struct Deliver {
    config: DeliverConfig,
    stat: Arc<Stat>,
    clients: Vec<Client>,
    ingress_tx: mpsc::Sender<Payload>,
    ingress_rx: mpsc::Receiver<Payload>,
    token: CancellationToken,
}

impl Deliver {
    /// Create a dispatcher; fails fast when no remote address is configured
    pub fn new(token: CancellationToken, config: DeliverConfig) -> Result<Self, DeliverError> {
        if config.remote_addr.is_empty() {
            return Err(DeliverError::MissingRemoteAddr);
        }
        debug!(?config, "deliver configured");

        let (ingress_tx, ingress_rx) = mpsc::channel(config.queue_capacity);

        Ok(Self {
            config,
            stat: Arc::new(Stat::new()),
            clients: Vec::new(),
            ingress_tx,
            ingress_rx,
            token,
        })
    }

    /// Create a dispatcher with a pre-built pool (custom senders, tests)
    ///
    /// `run` leaves a pre-built pool alone instead of constructing clients
    /// from the configuration.
    pub fn with_clients(
        config: DeliverConfig,
        clients: Vec<Client>,
        token: CancellationToken,
    ) -> Self {
        let (ingress_tx, ingress_rx) = mpsc::channel(config.queue_capacity);
        Self {
            config,
            stat: Arc::new(Stat::new()),
            clients,
            ingress_tx,
            ingress_rx,
            token,
        }
    }

    /// The inbound payload queue; the sole ingestion API
    pub fn ingress(&self) -> mpsc::Sender<Payload> {
        self.ingress_tx.clone()
    }

    /// Shared dispatch counters for reporting collaborators
    pub fn stat(&self) -> Arc<Stat> {
        Arc::clone(&self.stat)
    }

    /// Clients currently in the pool
    pub fn pool_size(&self) -> usize {
        self.clients.len()
    }

    /// Construct `concurrency` clients with identical configuration and
    /// distinct indices
    ///
    /// A construction failure is logged and the slot skipped; the pool may end
    /// up smaller than configured. Completes before the dispatch loop reads a
    /// single payload.
    #[instrument(
        name = "deliver_build_pool",
        skip(self),
        fields(concurrency = self.config.concurrency)
    )]
    pub async fn build_pool(&mut self) {
        let client_config = self.config.client_config();
        for idx in 0..self.config.concurrency {
            match Client::connect(idx, &client_config, self.token.child_token()).await {
                Ok(client) => self.clients.push(client),
                Err(e) => error!(idx, error = %e, "failed to create client, slot skipped"),
            }
        }
        info!(
            pool = self.clients.len(),
            configured = self.config.concurrency,
            "client pool ready"
        );
    }

    /// Direct access to one uniformly-randomly-chosen client's sender ingress
    ///
    /// For driving ad hoc sends outside the dispatch loop (raw mode).
    pub fn random_sender(&self) -> Result<mpsc::Sender<Payload>, DeliverError> {
        let idx = pick(&self.clients)?;
        Ok(self.clients[idx].ingress())
    }

    /// Run until cancellation
    ///
    /// In request mode this builds the pool (when not pre-built), then clones
    /// and routes inbound payloads; in raw mode it only parks on the
    /// cancellation token. Cancellation is a normal termination reason, not a
    /// failure: the final counters are returned as a report.
    #[instrument(name = "deliver_run", skip(self), fields(mode = ?self.config.mode))]
    pub async fn run(mut self) -> Result<DeliverReport, DeliverError> {
        // Pool construction fully completes before the loop reads the queue;
        // a pre-built pool (raw drivers, tests) is left alone
        if self.config.mode == DeliverMode::Request && self.clients.is_empty() {
            self.build_pool().await;
        }

        let Deliver {
            config,
            stat,
            clients,
            ingress_tx,
            mut ingress_rx,
            token,
        } = self;

        // The dispatch loop must never keep itself alive through its own queue
        drop(ingress_tx);

        if config.mode == DeliverMode::Request {
            if clients.is_empty() {
                error!("no client survived pool construction");
                return Err(DeliverError::EmptyPool);
            }

            stat.mark_started();
            info!(pool = clients.len(), clone = config.clone, "dispatch loop started");

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    maybe = ingress_rx.recv() => match maybe {
                        Some(payload) => dispatch(&config, &clients, &stat, payload).await,
                        None => {
                            info!("ingress closed, dispatch loop draining stopped");
                            break;
                        }
                    }
                }
            }
        } else {
            token.cancelled().await;
        }

        let pool_size = clients.len();
        let senders: Vec<(String, SenderMetricsSnapshot)> = clients
            .iter()
            .map(|client| (client.name().to_string(), client.metrics().snapshot()))
            .collect();

        for client in clients {
            client.shutdown().await;
        }

        info!(
            total = stat.total(),
            "deliver stopped by cancellation"
        );

        Ok(DeliverReport {
            pool_size,
            stat: stat.snapshot(),
            senders,
        })
    }
}

/// Pick a client index uniformly at random, with replacement
fn pick(clients: &[Client]) -> Result<usize, DeliverError> {
    if clients.is_empty() {
        return Err(DeliverError::EmptyPool);
    }
    Ok(rand::rng().random_range(0..clients.len()))
}

/// Clone one inbound payload `clone + 1` times and route each copy to a
/// randomly chosen client
async fn dispatch(config: &DeliverConfig, clients: &[Client], stat: &Stat, payload: Payload) {
    for _ in 0..config.clone + 1 {
        stat.record();
        if let Some(rate) = stat.sample(Instant::now()) {
            info!(
                total = stat.total(),
                per_second = rate,
                "deliver throughput"
            );
        }

        let idx = match pick(clients) {
            Ok(idx) => idx,
            Err(e) => {
                error!(seq = payload.seq, error = %e, "payload dropped");
                return;
            }
        };

        if !clients[idx].send(payload.clone()).await {
            warn!(client = idx, seq = payload.seq, "copy dropped");
            continue;
        }

        debug!(
            remote = %config.remote_addr,
            client = idx,
            seq = payload.seq,
            "payload routed"
        );
    }
}
