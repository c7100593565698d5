//! Transaction log synchronization pipeline
//!
//! One cycle = discover client directories on the remote store, download each
//! pending CSV log, validate and parse it, upsert its records inside a single
//! database transaction, and archive the remote file once the transaction has
//! committed. The scheduler drives cycles on an interval and on demand.

pub mod parser;
pub mod scheduler;
pub mod walker;
pub mod writer;

pub use scheduler::{ServiceStatus, SyncContext, SyncScheduler};

/// Counters accumulated over one sync cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStats {
    pub files_processed: u64,
    pub errors: u64,
}
