//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Replicast - traffic-replication dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "replicast",
    author,
    version,
    about = "Traffic replication dispatcher",
    long_about = "A traffic-replication dispatcher for replaying and load-testing remote endpoints.\n\n\
                  Produces or replays request payloads, clones each one a configurable number \n\
                  of times, and fans the copies out across a pool of concurrent senders."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "REPLICAST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "REPLICAST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a replication session
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "REPLICAST_CONFIG")]
    pub config: PathBuf,

    /// Override the target address from configuration
    #[arg(long, env = "REPLICAST_ADDR")]
    pub addr: Option<String>,

    /// Override the client pool size from configuration
    #[arg(long, env = "REPLICAST_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Override the clone count from configuration
    #[arg(long = "clone", env = "REPLICAST_CLONE")]
    pub clone_count: Option<usize>,

    /// Stop after this many seconds (0 = unlimited)
    #[arg(long, default_value = "0", env = "REPLICAST_DURATION")]
    pub duration: u64,

    /// Stop after producing this many payloads (0 = unlimited)
    #[arg(long, default_value = "0", env = "REPLICAST_MAX_PAYLOADS")]
    pub max_payloads: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "REPLICAST_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running the session
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show payload source details
    #[arg(long)]
    pub source: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
