//! Server start-up: database, state, background worker and HTTP listener.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use questhub_core::config::AppConfig;
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_database::DatabasePool;
use questhub_database::migration::run_migrations;
use questhub_worker::jobs::{AssignmentSweepJob, QuestExpiryJob};
use questhub_worker::{CronScheduler, JobExecutor, ScheduledJob};

use crate::router::build_router;
use crate::state::AppState;

/// How long a job run holds its single-runner lock.
const JOB_LOCK_TTL: Duration = Duration::from_secs(15 * 60);

/// Runs the QuestHub server with the given configuration.
///
/// Connects to PostgreSQL, applies migrations when
/// `database.run_migrations` is set, wires the application state, starts the
/// scheduled jobs when `worker.enabled` is set, then serves HTTP until a
/// shutdown signal arrives.
pub async fn launch(config: AppConfig) -> AppResult<()> {
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        cache = %config.cache.provider,
        storage = %config.storage.provider,
        "Starting QuestHub server"
    );

    let db = DatabasePool::connect(&config.database).await?;
    if config.database.run_migrations {
        run_migrations(db.pool()).await?;
    }

    let state = AppState::build(config, db).await?;

    let mut scheduler = if state.config.worker.enabled {
        Some(start_worker(&state).await?)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    let result = run_server(state.clone()).await;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
        }
    }
    state.db.close().await;
    result
}

async fn start_worker(state: &AppState) -> AppResult<CronScheduler> {
    let executor = JobExecutor::new(state.cache.clone(), JOB_LOCK_TTL);
    let scheduler = CronScheduler::new(executor).await?;
    let sweep: Arc<dyn ScheduledJob> =
        Arc::new(AssignmentSweepJob::new(Arc::clone(&state.shop_request_service)));
    let expiry: Arc<dyn ScheduledJob> =
        Arc::new(QuestExpiryJob::new(Arc::clone(&state.quest_service)));
    scheduler
        .register_default_tasks(&state.config.worker, sweep, expiry)
        .await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
///
/// After the signal, in-flight requests get `server.shutdown_grace_seconds`
/// to finish before remaining connections are dropped.
pub async fn run_server(state: AppState) -> AppResult<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(address = %addr, "QuestHub server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
        let _ = shutdown_tx.send(true);
    });

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            let _ = shutdown_rx.changed().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Grace period elapsed, closing open connections"
            );
        }
    }

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
