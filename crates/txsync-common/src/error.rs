//! Error types shared across the txsync workspace

use thiserror::Error;

/// Result type alias for txsync operations
pub type Result<T> = std::result::Result<T, TxSyncError>;

/// Main error type for txsync
#[derive(Error, Debug)]
pub enum TxSyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(String),
}
