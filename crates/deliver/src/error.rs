//! Deliver error types

use thiserror::Error;

/// Deliver-specific errors
#[derive(Debug, Error)]
pub enum DeliverError {
    /// Configuration carries no remote address
    #[error("deliver config has no remote address")]
    MissingRemoteAddr,

    /// An operation needed a client but the pool holds none
    #[error("client pool is empty")]
    EmptyPool,

    /// Sender error (from contract)
    #[error("sender error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
