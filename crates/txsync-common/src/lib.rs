//! txsync Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the txsync workspace.
//!
//! # Overview
//!
//! This crate provides functionality used by every txsync workspace member:
//!
//! - **Error Handling**: the [`TxSyncError`] type and [`Result`] alias
//! - **Logging**: `tracing` subscriber bootstrap with console/file targets
//! - **Types**: the transaction record shared by parser, writer, and API
//! - **Timestamps**: lenient timestamp parsing for transaction log rows

pub mod error;
pub mod logging;
pub mod timefmt;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TxSyncError};
pub use types::TransactionRecord;
