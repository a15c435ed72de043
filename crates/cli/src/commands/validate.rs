//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{DeliverMode, ReplayPlan, SourceKind};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    target_addr: String,
    mode: String,
    concurrency: usize,
    clone: usize,
    source_kind: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(plan) => {
            let warnings = collect_warnings(&plan);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", plan.version),
                    target_addr: plan.target.addr.clone(),
                    mode: format!("{:?}", plan.delivery.mode),
                    concurrency: plan.delivery.concurrency,
                    clone: plan.delivery.clone,
                    source_kind: format!("{:?}", plan.source.kind),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(plan: &ReplayPlan) -> Vec<String> {
    let mut warnings = Vec::new();

    // A non-IPv4 host never reaches the network
    if !host_is_ipv4(&plan.target.addr) {
        warnings.push(format!(
            "Target host in '{}' is not a literal IPv4 address - every client will fall back to local capture files",
            plan.target.addr
        ));
    }

    if plan.delivery.mode == DeliverMode::Raw {
        warnings.push(
            "Raw mode: no client pool or dispatch loop is started; intended for embedding"
                .to_string(),
        );
    }

    if plan.source.kind == SourceKind::Capture && plan.source.loop_playback {
        warnings.push("Capture loops forever - stop the run with a duration or Ctrl+C".to_string());
    }

    warnings
}

fn host_is_ipv4(addr: &str) -> bool {
    addr.rsplit_once(':')
        .map(|(host, _)| host.parse::<std::net::Ipv4Addr>().is_ok())
        .unwrap_or(false)
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Target: {}", summary.target_addr);
            println!("  Mode: {}", summary.mode);
            println!("  Concurrency: {}", summary.concurrency);
            println!("  Clone: {}", summary.clone);
            println!("  Source: {}", summary.source_kind);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
