//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    target: TargetInfo,
    delivery: DeliveryInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<SourceInfo>,
}

#[derive(Serialize)]
struct TargetInfo {
    addr: String,
    long_lived: bool,
    fallback_dir: String,
}

#[derive(Serialize)]
struct DeliveryInfo {
    mode: String,
    concurrency: usize,
    clone: usize,
    queue_capacity: usize,
    protocol: String,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    rate_hz: f64,
    payload_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    loop_playback: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&plan, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&plan, args);
    }

    Ok(())
}

fn build_config_info(plan: &contracts::ReplayPlan, args: &InfoArgs) -> ConfigInfo {
    let source = if args.source {
        Some(SourceInfo {
            kind: format!("{:?}", plan.source.kind),
            rate_hz: plan.source.rate_hz,
            payload_size: plan.source.payload_size,
            path: plan.source.path.as_ref().map(|p| p.display().to_string()),
            loop_playback: plan.source.loop_playback,
        })
    } else {
        None
    };

    ConfigInfo {
        version: format!("{:?}", plan.version),
        target: TargetInfo {
            addr: plan.target.addr.clone(),
            long_lived: plan.target.long_lived,
            fallback_dir: plan.target.fallback_dir.display().to_string(),
        },
        delivery: DeliveryInfo {
            mode: format!("{:?}", plan.delivery.mode),
            concurrency: plan.delivery.concurrency,
            clone: plan.delivery.clone,
            queue_capacity: plan.delivery.queue_capacity,
            protocol: format!("{:?}", plan.delivery.protocol),
        },
        source,
    }
}

fn print_config_info(plan: &contracts::ReplayPlan, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Replicast Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Target info
    println!("🎯 Target");
    println!("   ├─ Version: {:?}", plan.version);
    println!("   ├─ Address: {}", plan.target.addr);
    println!(
        "   ├─ Connections: {}",
        if plan.target.long_lived {
            "long-lived"
        } else {
            "per-request"
        }
    );
    println!(
        "   └─ Fallback dir: {}",
        plan.target.fallback_dir.display()
    );

    // Delivery settings
    println!("\n📤 Delivery");
    println!("   ├─ Mode: {:?}", plan.delivery.mode);
    println!("   ├─ Concurrency: {}", plan.delivery.concurrency);
    println!("   ├─ Clone: {}", plan.delivery.clone);
    println!("   ├─ Queue capacity: {}", plan.delivery.queue_capacity);
    println!("   └─ Protocol: {:?}", plan.delivery.protocol);

    // Source
    if args.source {
        println!("\n📦 Source");
        println!("   ├─ Kind: {:?}", plan.source.kind);
        println!("   ├─ Rate: {} Hz", plan.source.rate_hz);
        println!("   ├─ Payload size: {} bytes", plan.source.payload_size);
        match &plan.source.path {
            Some(path) => println!("   ├─ Path: {}", path.display()),
            None => println!("   ├─ Path: (none)"),
        }
        println!("   └─ Loop playback: {}", plan.source.loop_playback);
    } else {
        println!("\n📦 Source: {:?}", plan.source.kind);
    }

    println!();
}
