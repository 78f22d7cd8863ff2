//! Application builder: wires router, state, and the worker pool.

use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;
use tracing::{error, info};

use screening_cache::{CacheManager, ScreeningCache};
use screening_core::config::AppConfig;
use screening_core::error::AppError;
use screening_core::traits::cache::CacheProvider;
use screening_database::repositories::{JobPostingRepository, TaskRepository};
use screening_database::{DatabasePool, PgScreeningStore, PgTaskQueue, ScreeningStore, TaskQueue};
use screening_entity::screening::MatchBands;
use screening_service::{
    HttpResumeAnalyzer, HttpResumeParser, RankingEngine, RequirementsService,
    ScreeningCoordinator,
};
use screening_worker::{ScreeningJobHandler, WorkerRunner};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the API server and, when enabled, the worker pool until a shutdown signal.
pub async fn run_server(config: AppConfig, database: DatabasePool) -> Result<(), AppError> {
    info!("Starting resume screening server...");
    let config = Arc::new(config);

    // ── Cache ────────────────────────────────────────────────────
    info!(provider = %config.cache.provider, "Initializing cache");
    let provider: Arc<dyn CacheProvider> = Arc::new(CacheManager::new(&config.cache).await?);
    let cache = ScreeningCache::new(provider, config.cache.ttl.clone());

    // ── Store and queue ──────────────────────────────────────────
    let pool = database.pool().clone();
    let store: Arc<dyn ScreeningStore> = Arc::new(PgScreeningStore::new(pool.clone()));
    let queue: Arc<dyn TaskQueue> = Arc::new(PgTaskQueue::new(TaskRepository::new(pool.clone())));

    let coordinator = Arc::new(ScreeningCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&queue),
        cache.clone(),
        config.screening.clone(),
    ));

    // ── Worker pool ──────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = if config.worker.enabled {
        let handler = ScreeningJobHandler::new(
            Arc::clone(&store),
            Arc::new(HttpResumeParser::new(&config.collaborators.parser)?),
            Arc::new(HttpResumeAnalyzer::new(&config.collaborators.analyzer)?),
            RequirementsService::new(Arc::new(JobPostingRepository::new(pool)), cache.clone()),
            cache,
            RankingEngine::new(MatchBands::from(&config.screening.ranking)),
        );
        let worker_id = format!("worker-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let runner = WorkerRunner::new(
            Arc::clone(&queue),
            Arc::new(handler),
            config.worker.clone(),
            worker_id,
        );
        let worker_shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            runner.run(worker_shutdown).await;
        }))
    } else {
        info!("Worker pool disabled in this process");
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let app = build_app(AppState::new(Arc::clone(&config), coordinator));
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "Resume screening server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "Worker task ended abnormally");
        }
    }
    database.close().await;
    info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received");
}
