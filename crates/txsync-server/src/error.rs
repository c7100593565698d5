//! Server-specific error types

use thiserror::Error;

/// Result type alias for sync pipeline operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Errors raised by the sync pipeline.
///
/// The scheduler maps these onto the error taxonomy: connect-level failures
/// abort the cycle, per-file failures skip the file, and both increment the
/// processing error counter. Per-row failures never surface here; the parser
/// and writer swallow them after logging.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("SSH transport error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("Host key verification failed for {host}")]
    HostKeyVerification { host: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid header in {file}: expected ID,ClientID,Transaction,Amount,Date,Status")]
    InvalidHeader { file: String },

    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Common(#[from] txsync_common::TxSyncError),
}
