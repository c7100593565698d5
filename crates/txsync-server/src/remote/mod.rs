//! Remote file transfer
//!
//! SFTP access to the hierarchical log store. The client is blocking
//! (libssh2) and is driven from the async runtime via `spawn_blocking`; one
//! session is opened per sync cycle and dropped when the cycle ends.

use std::path::Path;

use crate::error::SyncResult;

pub mod sftp;

pub use sftp::{RemoteEntry, SftpClient};

/// Operations one sync cycle performs against the remote store.
///
/// [`SftpClient`] is the real implementation; the walker is generic over this
/// trait so its archive-after-commit ordering can be exercised without a live
/// session.
pub(crate) trait RemoteStore {
    async fn read_dir(&self, path: &str) -> SyncResult<Vec<RemoteEntry>>;
    async fn download(&self, remote_path: &str, local_path: &Path) -> SyncResult<u64>;
    async fn rename(&self, from: &str, to: &str) -> SyncResult<()>;
    async fn ensure_dir(&self, path: &str) -> SyncResult<()>;
}
