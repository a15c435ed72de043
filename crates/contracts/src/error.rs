//! Layered error definitions
//!
//! Categorized by source: config / sender / frame

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sender Errors =====
    /// Sender transport open error
    #[error("sender '{sender}' connection error: {message}")]
    SenderConnection { sender: String, message: String },

    /// Sender write error
    #[error("sender '{sender}' write error: {message}")]
    SenderWrite { sender: String, message: String },

    // ===== Frame Errors =====
    /// Capture frame decode error
    #[error("frame decode error: {message}")]
    FrameDecode { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sender connection error
    pub fn sender_connection(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SenderConnection {
            sender: sender.into(),
            message: message.into(),
        }
    }

    /// Create sender write error
    pub fn sender_write(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SenderWrite {
            sender: sender.into(),
            message: message.into(),
        }
    }

    /// Create frame decode error
    pub fn frame_decode(message: impl Into<String>) -> Self {
        Self::FrameDecode {
            message: message.into(),
        }
    }
}
