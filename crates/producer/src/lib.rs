//! # Producer
//!
//! Payload production module.
//!
//! Responsibilities:
//! - Generate synthetic payloads or replay recorded capture files
//! - Frame payload bodies per the configured protocol kind
//! - Feed the deliver ingress channel, respecting backpressure
//!
//! ## Usage Example
//!
//! ```ignore
//! use producer::{PayloadSource, ProducerMetrics, SyntheticConfig, SyntheticSource};
//!
//! let source = SyntheticSource::new(SyntheticConfig::default());
//! source.start(deliver.ingress(), metrics);
//! // ... run ...
//! source.stop();
//! ```

pub mod capture;
pub mod config;
pub mod encoder;
pub mod source;
pub mod synthetic;

pub use capture::{CaptureConfig, CaptureSource};
pub use config::{ProducerMetrics, ProducerMetricsSnapshot};
pub use contracts::{Payload, ProtocolKind};
pub use source::PayloadSource;
pub use synthetic::{SyntheticConfig, SyntheticSource};
