//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - A `Payload` is an opaque, pre-framed byte sequence with a producer-stamped
//!   sequence number used for diagnostics only
//! - `Transport` is the sender capability; the variant is chosen once per client
//!   and never re-dispatched afterwards

mod error;
mod payload;
mod plan;
mod sender;
mod throughput;

pub use error::*;
pub use payload::Payload;
pub use plan::*;
pub use sender::*;
pub use throughput::ThroughputSnapshot;
