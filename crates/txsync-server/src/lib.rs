//! txsync Server Library
//!
//! Background synchronization service for per-client transaction logs.
//!
//! # Overview
//!
//! The service pulls CSV transaction logs from a remote SFTP tree, validates
//! and parses them, upserts the records into PostgreSQL, and archives each
//! file remotely once its database transaction has committed:
//!
//! - **Sync pipeline**: scheduler loop, remote directory walker, CSV parser,
//!   and idempotent upsert writer
//! - **Remote transfer**: blocking SFTP client driven from the async runtime
//! - **Control API**: status snapshot, manual trigger, graceful shutdown,
//!   and a per-client transaction query
//! - **Database**: bounded PostgreSQL pool, schema owned via migrations
//!
//! # Architecture
//!
//! One scheduler task drives one cycle at a time; within a cycle files are
//! processed strictly sequentially, so at most one SFTP session and one
//! database transaction are in flight. The axum API shares only the status
//! mutex and two coalescing signal slots (trigger, shutdown) with the
//! scheduler. Shutdown is cooperative: it is observed between cycles and
//! between files, never mid-transaction.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod remote;
pub mod sync;

// Re-export commonly used types
pub use error::{SyncError, SyncResult};
