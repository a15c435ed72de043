//! Session orchestrator - coordinates producer, deliver and reporting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use contracts::{DeliverMode, ReplayPlan, SourceKind};
use deliver::{Deliver, DeliverConfig, DeliverReport};
use observability::ThroughputAggregator;
use producer::{
    CaptureConfig, CaptureSource, PayloadSource, ProducerMetrics, SyntheticConfig, SyntheticSource,
};

use super::SessionStats;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The loaded replay plan
    pub plan: ReplayPlan,

    /// Stop the session after this long (None = unlimited)
    pub duration: Option<Duration>,

    /// Stop after producing this many payloads (None = unlimited)
    pub max_payloads: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main session orchestrator
pub struct Session {
    config: SessionConfig,
}

impl Session {
    /// Create a new session with the given configuration
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session until a limit is reached or the token fires
    pub async fn run(self, token: CancellationToken) -> Result<SessionStats> {
        let start = Instant::now();
        let plan = &self.config.plan;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Set up the dispatcher
        let deliver = Deliver::new(token.child_token(), DeliverConfig::from_plan(plan))
            .context("Failed to create deliver")?;
        let ingress = deliver.ingress();
        let stat = deliver.stat();

        let mut deliver_handle = tokio::spawn(deliver.run());
        info!("Deliver started");

        // Set up the payload source (request mode only; raw mode has no
        // dispatch loop to feed)
        let producer_metrics = Arc::new(ProducerMetrics::new());
        let source: Option<Box<dyn PayloadSource>> = if plan.delivery.mode == DeliverMode::Request {
            let source = build_source(plan)?;
            source.start(ingress, producer_metrics.clone());
            info!(source = source.name(), "Payload source started");
            Some(source)
        } else {
            drop(ingress);
            info!("Raw mode: no payload source started");
            None
        };

        // Reporting loop: sample throughput once per second, enforce limits
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let mut aggregator = ThroughputAggregator::new();
        let deadline = self.config.duration.map(|d| start + d);

        let report: DeliverReport = loop {
            tokio::select! {
                joined = &mut deliver_handle => {
                    let report = joined
                        .context("Deliver task panicked")?
                        .context("Deliver failed")?;
                    break report;
                }
                _ = ticker.tick() => {
                    let snapshot = stat.snapshot();
                    observability::record_throughput(&snapshot);
                    aggregator.update(&snapshot);

                    if let Some(max) = self.config.max_payloads {
                        if producer_metrics.snapshot().payloads_produced >= max {
                            info!(max, "Payload limit reached, stopping session");
                            token.cancel();
                        }
                    }
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            info!("Duration reached, stopping session");
                            token.cancel();
                        }
                    }
                }
            }
        };

        if let Some(source) = source {
            source.stop();
        }
        // The deliver side is already down; make sure everything else follows
        token.cancel();

        let produced = producer_metrics.snapshot();
        if produced.decode_errors > 0 {
            warn!(
                decode_errors = produced.decode_errors,
                "Capture frames failed to decode"
            );
        }

        // Final sample so short runs still report totals
        aggregator.update(&report.stat);

        let mut stats = SessionStats {
            payloads_produced: produced.payloads_produced,
            requests_dispatched: report.stat.total_requests,
            pool_size: report.pool_size,
            duration: start.elapsed(),
            throughput: aggregator,
            ..Default::default()
        };

        for (name, metrics) in &report.senders {
            observability::record_sender_outcome(
                name,
                metrics.write_count,
                metrics.failure_count,
                metrics.dropped_count,
            );
            stats.sender_writes += metrics.write_count;
            stats.sender_failures += metrics.failure_count;
            stats.sender_dropped += metrics.dropped_count;
        }

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            rps = format!("{:.2}", stats.rps()),
            "Session shutdown complete"
        );

        Ok(stats)
    }
}

/// Build the payload source described by the plan
fn build_source(plan: &ReplayPlan) -> Result<Box<dyn PayloadSource>> {
    match plan.source.kind {
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(SyntheticConfig {
            name: "synthetic".to_string(),
            rate_hz: plan.source.rate_hz,
            payload_size: plan.source.payload_size,
            protocol: plan.delivery.protocol,
            max_payloads: None,
        }))),
        SourceKind::Capture => {
            let path = plan
                .source
                .path
                .clone()
                .context("Capture source requires source.path")?;
            Ok(Box::new(CaptureSource::new(CaptureConfig {
                name: "capture".to_string(),
                path,
                protocol: plan.delivery.protocol,
                rate_hz: plan.source.rate_hz,
                loop_playback: plan.source.loop_playback,
            })))
        }
    }
}
