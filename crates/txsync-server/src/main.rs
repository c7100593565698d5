//! txsync Server - Main entry point

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use txsync_common::logging::{init_logging, LogConfig};

use txsync_server::{
    api::{self, ApiState},
    config::Config,
    db,
    sync::{SyncContext, SyncScheduler},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::from_env()
        .unwrap_or_default()
        .with_log_file_prefix("txsync-server");
    init_logging(&log_config)?;

    info!("Starting txsync server");

    // Load configuration
    let config = Config::load()?;
    info!(
        source_root = %config.sftp.source_root,
        archive_root = %config.sftp.archive_root,
        "Configuration loaded - control API will bind to {}:{}",
        config.api.host,
        config.api.port
    );

    // Initialize database connection pool
    let pool = db::create_pool(&config.database).await?;

    // Run migrations - the transaction_logs schema is owned by this service
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    // Start the sync scheduler
    let scheduler = Arc::new(SyncScheduler::new(Duration::from_secs(
        config.sync.interval_secs,
    )));
    let ctx = SyncContext {
        sftp: config.sftp.clone(),
        pool: pool.clone(),
    };
    let scheduler_handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run(ctx).await }
    });
    info!("Sync scheduler started");

    // Build the control API router
    let state = ApiState {
        db: pool,
        scheduler: scheduler.clone(),
    };
    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port).parse()?;
    info!("Control API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve until ctrl-c, SIGTERM, or the API shutdown action
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(
            scheduler.clone(),
            scheduler.shutdown_token(),
        ))
        .await?;

    // Let the scheduler drain its in-flight cycle before exiting
    scheduler_handle.await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Resolves when shutdown is requested from any source, and makes sure the
/// scheduler token is cancelled in every case.
async fn shutdown_signal(scheduler: Arc<SyncScheduler>, token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
        _ = token.cancelled() => {
            info!("Shutdown requested via control API");
        },
    }

    scheduler.shutdown();
}
