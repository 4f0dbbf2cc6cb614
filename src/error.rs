//! Error handling module for netinventory
//!
//! Provides centralized error types using thiserror. Only the loading layer
//! (snapshots, install.inf, config) produces errors; classification itself
//! never fails and reports problems through logging instead.

use thiserror::Error;

/// Main error type for netinventory
#[derive(Error, Debug)]
pub enum InventoryError {
    /// IO errors (reading snapshots, install.inf, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (loading, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Probe snapshot has an unexpected shape
    #[error("Invalid probe snapshot: {0}")]
    Snapshot(String),

    /// Bucket name not one of netcard/modem/isdn/dsl/all
    #[error("Unknown probe bucket: {0}")]
    UnknownBucket(String),
}

/// Result type alias for netinventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

impl InventoryError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create an unknown bucket error
    pub fn unknown_bucket(name: impl Into<String>) -> Self {
        Self::UnknownBucket(name.into())
    }
}
