//! Sync scheduler
//!
//! Owns the operational status snapshot and the two signal slots (manual
//! trigger, shutdown) shared with the control API, and drives sync cycles on
//! a fixed interval and on demand. Exactly one cycle runs at a time: the
//! scheduler is a single task and every cycle is awaited to completion before
//! the next signal is examined.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{walker, CycleStats};
use crate::config::SftpConfig;

/// Operational status exposed through `GET /status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub last_check: Option<DateTime<Utc>>,
    pub cycle_count: u64,
    pub files_processed: u64,
    pub processing_errors: u64,
}

/// Dependencies a cycle needs: remote store settings and the shared pool.
#[derive(Clone)]
pub struct SyncContext {
    pub sftp: SftpConfig,
    pub pool: PgPool,
}

/// Scheduler state shared (behind `Arc`) with the control API.
///
/// The trigger slot coalesces: `Notify` holds at most one permit, so
/// requesting a sync while one is already pending is a silent no-op and can
/// never queue up back-to-back cycles.
pub struct SyncScheduler {
    status: Mutex<ServiceStatus>,
    trigger: Notify,
    shutdown: CancellationToken,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            status: Mutex::new(ServiceStatus::default()),
            trigger: Notify::new(),
            shutdown: CancellationToken::new(),
            interval,
        }
    }

    /// Current status, cloned under the lock. Never waits on a cycle.
    pub fn status_snapshot(&self) -> ServiceStatus {
        self.lock_status().clone()
    }

    /// Enqueue a manual sync request. Non-blocking and idempotent: a second
    /// request while one is pending coalesces into it.
    pub fn request_sync(&self) {
        self.trigger.notify_one();
    }

    /// Signal the scheduler to stop after the in-flight work drains.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token observed by the run loop, the walker, and the HTTP server's
    /// graceful shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run the scheduler until shutdown is signalled.
    ///
    /// One cycle runs immediately at startup, then the loop alternates
    /// between the interval timer and the manual trigger. A manual cycle
    /// resets the timer so a scheduled cycle does not fire right behind it.
    pub async fn run(&self, ctx: SyncContext) {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the timer
        // measures from now.
        timer.tick().await;

        info!(interval_secs = self.interval.as_secs(), "Sync scheduler started");
        self.run_cycle(&ctx).await;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,

                _ = timer.tick() => {
                    debug!("Scheduled sync cycle");
                    self.run_cycle(&ctx).await;
                },

                _ = self.trigger.notified() => {
                    info!("Manual sync triggered");
                    self.run_cycle(&ctx).await;
                    timer.reset();
                },
            }
        }

        info!("Sync scheduler stopped");
    }

    /// One cycle: stamp the status, walk the remote store, fold the results
    /// back into the counters. A connect-level failure aborts only this
    /// cycle; the next one starts from scratch.
    async fn run_cycle(&self, ctx: &SyncContext) {
        let cycle = {
            let mut status = self.lock_status();
            status.running = true;
            status.last_check = Some(Utc::now());
            status.cycle_count += 1;
            status.cycle_count
        };

        info!(cycle, "Starting sync cycle");

        let stats = match walker::run_cycle(ctx, &self.shutdown).await {
            Ok(stats) => stats,
            Err(e) => {
                error!(cycle, error = %e, "Sync cycle aborted");
                CycleStats {
                    files_processed: 0,
                    errors: 1,
                }
            },
        };

        {
            let mut status = self.lock_status();
            status.running = false;
            status.files_processed += stats.files_processed;
            status.processing_errors += stats.errors;
        }

        info!(
            cycle,
            files = stats.files_processed,
            errors = stats.errors,
            "Sync cycle completed"
        );
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, ServiceStatus> {
        // A poisoned status lock only means a panic mid-update; the counters
        // are still usable.
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::timeout;

    fn scheduler() -> Arc<SyncScheduler> {
        Arc::new(SyncScheduler::new(Duration::from_secs(300)))
    }

    #[test]
    fn test_initial_status() {
        let status = scheduler().status_snapshot();
        assert!(!status.running);
        assert!(status.last_check.is_none());
        assert_eq!(status.cycle_count, 0);
        assert_eq!(status.files_processed, 0);
        assert_eq!(status.processing_errors, 0);
    }

    #[tokio::test]
    async fn test_trigger_coalesces() {
        let scheduler = scheduler();

        // Two requests while nothing is listening collapse into one permit.
        scheduler.request_sync();
        scheduler.request_sync();

        timeout(Duration::from_millis(50), scheduler.trigger.notified())
            .await
            .expect("first wait should consume the pending permit");

        let second = timeout(Duration::from_millis(50), scheduler.trigger.notified()).await;
        assert!(second.is_err(), "second wait should find no pending permit");
    }

    #[tokio::test]
    async fn test_shutdown_signal_observed() {
        let scheduler = scheduler();
        let token = scheduler.shutdown_token();
        assert!(!token.is_cancelled());

        scheduler.shutdown();
        assert!(token.is_cancelled());
        // Cancelling twice is fine.
        scheduler.shutdown();

        timeout(Duration::from_millis(50), token.cancelled())
            .await
            .expect("cancelled future should resolve after shutdown");
    }

    #[test]
    fn test_status_serializes_expected_fields() {
        let json = serde_json::to_value(scheduler().status_snapshot()).unwrap();
        for key in [
            "running",
            "last_check",
            "cycle_count",
            "files_processed",
            "processing_errors",
        ] {
            assert!(json.get(key).is_some(), "missing status field {key}");
        }
    }
}
