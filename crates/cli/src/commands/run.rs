//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Session, SessionConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref addr) = args.addr {
        info!(addr = %addr, "Overriding target address from CLI");
        plan.target.addr = addr.clone();
    }
    if let Some(concurrency) = args.concurrency {
        info!(concurrency, "Overriding pool size from CLI");
        plan.delivery.concurrency = concurrency;
    }
    if let Some(clone_count) = args.clone_count {
        info!(clone = clone_count, "Overriding clone count from CLI");
        plan.delivery.clone = clone_count;
    }

    info!(
        target = %plan.target.addr,
        long_lived = plan.target.long_lived,
        concurrency = plan.delivery.concurrency,
        clone = plan.delivery.clone,
        mode = ?plan.delivery.mode,
        source = ?plan.source.kind,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&plan);
        return Ok(());
    }

    // Build session configuration
    let session_config = SessionConfig {
        plan,
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        max_payloads: if args.max_payloads == 0 {
            None
        } else {
            Some(args.max_payloads)
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let session = Session::new(session_config);

    // Route shutdown signals into the session's cancellation token
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping session...");
        signal_token.cancel();
    });

    info!("Starting session...");

    let stats = session
        .run(token)
        .await
        .map_err(|e| CliError::session_execution(format!("{e:#}")))?;

    info!(
        payloads_produced = stats.payloads_produced,
        requests_dispatched = stats.requests_dispatched,
        duration_secs = stats.duration.as_secs_f64(),
        rps = format!("{:.2}", stats.rps()),
        "Session completed"
    );

    // Print detailed statistics
    stats.print_summary();

    info!("Replicast finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(plan: &contracts::ReplayPlan) {
    println!("\n=== Configuration Summary ===\n");
    println!("Target:");
    println!("  Address: {}", plan.target.addr);
    println!(
        "  Connections: {}",
        if plan.target.long_lived {
            "long-lived"
        } else {
            "per-request"
        }
    );
    println!("  Fallback dir: {}", plan.target.fallback_dir.display());

    println!("\nDelivery:");
    println!("  Mode: {:?}", plan.delivery.mode);
    println!("  Concurrency: {}", plan.delivery.concurrency);
    println!("  Clone: {}", plan.delivery.clone);
    println!("  Queue capacity: {}", plan.delivery.queue_capacity);
    println!("  Protocol: {:?}", plan.delivery.protocol);

    println!("\nSource:");
    println!("  Kind: {:?}", plan.source.kind);
    if let Some(ref path) = plan.source.path {
        println!("  Path: {}", path.display());
    }
    println!("  Rate: {} Hz", plan.source.rate_hz);

    println!();
}
