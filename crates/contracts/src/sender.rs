//! Transport trait - sender output interface
//!
//! Defines the abstract interface the three sender variants implement.

use crate::{ContractError, Payload};

/// Sender transport trait
///
/// All sender variant implementations must implement this trait. The variant is
/// selected once at client construction and never changes afterwards.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Transport instance name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one payload
    ///
    /// # Errors
    /// Returns write error (should include context); a failed send is not retried
    async fn send(&mut self, payload: &Payload) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close transport
    async fn close(&mut self) -> Result<(), ContractError>;
}
