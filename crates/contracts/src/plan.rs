//! ReplayPlan - Config Loader output
//!
//! Describes a complete replay run: target endpoint, delivery/pool settings,
//! payload source.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete replay configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayPlan {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Remote target settings
    pub target: TargetConfig,

    /// Delivery/pool settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Payload source settings
    #[serde(default)]
    pub source: SourceConfig,
}

/// Remote target settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Target address, `host:port`; the host must be a literal IPv4 address
    /// for network delivery, anything else selects the local capture fallback
    pub addr: String,

    /// Reuse one connection per client (long-lived) instead of one connection
    /// per request
    #[serde(default = "default_long_lived")]
    pub long_lived: bool,

    /// Directory for the local capture fallback files
    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,
}

fn default_long_lived() -> bool {
    true
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("./capture")
}

/// Delivery/pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Client pool size
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Additional duplicate sends per inbound payload (0 = send once)
    #[serde(default)]
    pub clone: usize,

    /// Per-sender ingress queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Operating mode
    #[serde(default)]
    pub mode: DeliverMode,

    /// Payload framing, opaque to the dispatch core
    #[serde(default)]
    pub protocol: ProtocolKind,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            clone: 0,
            queue_capacity: default_queue_capacity(),
            mode: DeliverMode::default(),
            protocol: ProtocolKind::default(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    128
}

/// Deliver operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverMode {
    /// Pool + dispatch loop active
    #[default]
    Request,
    /// No pool started; an external driver picks senders itself
    Raw,
}

/// Payload framing kind
///
/// Interpreted only by the producer/encoder; the dispatch core passes it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    /// Fixed 4-byte big-endian length prefix
    #[default]
    Binary,
    /// LEB128 varint length prefix
    Compact,
}

/// Payload source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind
    #[serde(default)]
    pub kind: SourceKind,

    /// Production rate (payloads per second); 0 = unthrottled, paced by
    /// backpressure only
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// Synthetic payload body size in bytes
    #[serde(default = "default_payload_size")]
    pub payload_size: usize,

    /// Capture file to replay (capture kind only)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Restart the capture file from the beginning when it runs out
    #[serde(default)]
    pub loop_playback: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            rate_hz: default_rate_hz(),
            payload_size: default_payload_size(),
            path: None,
            loop_playback: false,
        }
    }
}

fn default_rate_hz() -> f64 {
    100.0
}

fn default_payload_size() -> usize {
    256
}

/// Payload source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Generated patterned payloads
    #[default]
    Synthetic,
    /// Replay of a recorded capture file
    Capture,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_defaults() {
        let plan: ReplayPlan = toml::from_str(
            r#"
[target]
addr = "127.0.0.1:9000"
"#,
        )
        .unwrap();

        assert_eq!(plan.version, ConfigVersion::V1);
        assert_eq!(plan.target.addr, "127.0.0.1:9000");
        assert!(plan.target.long_lived);
        assert_eq!(plan.target.fallback_dir, PathBuf::from("./capture"));
        assert_eq!(plan.delivery.concurrency, 4);
        assert_eq!(plan.delivery.clone, 0);
        assert_eq!(plan.delivery.queue_capacity, 128);
        assert_eq!(plan.delivery.mode, DeliverMode::Request);
        assert_eq!(plan.delivery.protocol, ProtocolKind::Binary);
        assert_eq!(plan.source.kind, SourceKind::Synthetic);
    }

    #[test]
    fn test_full_toml() {
        let plan: ReplayPlan = toml::from_str(
            r#"
[target]
addr = "10.0.0.5:8080"
long_lived = false
fallback_dir = "/tmp/cap"

[delivery]
concurrency = 16
clone = 3
queue_capacity = 256
mode = "raw"
protocol = "compact"

[source]
kind = "capture"
path = "traffic.cap"
rate_hz = 0.0
loop_playback = true
"#,
        )
        .unwrap();

        assert!(!plan.target.long_lived);
        assert_eq!(plan.delivery.concurrency, 16);
        assert_eq!(plan.delivery.clone, 3);
        assert_eq!(plan.delivery.mode, DeliverMode::Raw);
        assert_eq!(plan.delivery.protocol, ProtocolKind::Compact);
        assert_eq!(plan.source.kind, SourceKind::Capture);
        assert_eq!(plan.source.path, Some(PathBuf::from("traffic.cap")));
        assert!(plan.source.loop_playback);
    }

    #[test]
    fn test_json_round_trip() {
        let plan: ReplayPlan = toml::from_str(
            r#"
[target]
addr = "127.0.0.1:9000"

[delivery]
clone = 1
"#,
        )
        .unwrap();

        let json = serde_json::to_string(&plan).unwrap();
        let back: ReplayPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back.target.addr, plan.target.addr);
        assert_eq!(back.delivery.clone, 1);
    }
}
