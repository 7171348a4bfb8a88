//! StudyDrive server — the student portal's virtual filesystem.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, fmt};

use studydrive_core::config::AppConfig;
use studydrive_core::error::AppError;
use studydrive_core::events::EventBus;
use studydrive_database::repositories::{FileRepository, FolderRepository, TrashRepository};
use studydrive_service::file::FileService;
use studydrive_service::folder::{FolderService, TreeService};
use studydrive_service::reparent::ReparentService;
use studydrive_service::trash::TrashService;
use studydrive_storage::LocalBlobStore;
use studydrive_worker::executor::JobExecutor;
use studydrive_worker::jobs::retention::RetentionSweepHandler;
use studydrive_worker::scheduler::CronScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("STUDYDRIVE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting StudyDrive v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db_pool = studydrive_database::connection::create_pool(&config.database).await?;
    studydrive_database::migration::run_migrations(&db_pool).await?;

    // ── Blob store ───────────────────────────────────────────────
    let blobs = Arc::new(LocalBlobStore::new(&config.storage.local.root_path).await?);
    tracing::info!(
        root = %config.storage.local.root_path,
        "Blob store initialized"
    );

    // ── Repositories ─────────────────────────────────────────────
    let folder_repo = Arc::new(FolderRepository::new(db_pool.clone()));
    let file_repo = Arc::new(FileRepository::new(db_pool.clone()));
    let trash_repo = Arc::new(TrashRepository::new(db_pool.clone()));

    // ── Events + services ────────────────────────────────────────
    let events = EventBus::default();
    let tree = Arc::new(TreeService::new(folder_repo.clone()));
    let folder_service = Arc::new(FolderService::new(
        folder_repo.clone(),
        Arc::clone(&tree),
        events.clone(),
    ));
    let file_service = Arc::new(FileService::new(
        file_repo.clone(),
        folder_repo.clone(),
        blobs.clone(),
        events.clone(),
    ));
    let reparent_service = Arc::new(ReparentService::new(
        folder_repo.clone(),
        file_repo.clone(),
        Arc::clone(&tree),
        events.clone(),
    ));
    let trash_service = Arc::new(TrashService::new(
        folder_repo.clone(),
        file_repo.clone(),
        trash_repo.clone(),
        blobs.clone(),
        Arc::clone(&tree),
        events.clone(),
        config.retention.clone(),
    ));
    tracing::info!("Services initialized");

    // ── Event → log bridge ───────────────────────────────────────
    // External layers (UI refresh, notifications) attach their own
    // subscribers; the server itself just records what happened.
    let mut event_rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    tracing::debug!(actor = ?event.actor_id, payload = ?event.payload, "Domain event");
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event log bridge lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // ── Background worker ────────────────────────────────────────
    let scheduler = if config.worker.enabled {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(RetentionSweepHandler::new(
            (*trash_service).clone(),
        )));

        let scheduler = CronScheduler::new(Arc::new(executor)).await?;
        scheduler
            .register_retention_sweep(&config.worker.retention_sweep_cron)
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let app_state = studydrive_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        events: events.clone(),
        tree,
        folder_service,
        file_service,
        reparent_service,
        trash_service,
    };
    let app = studydrive_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("StudyDrive server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Graceful shutdown ────────────────────────────────────────
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await?;
    }
    db_pool.close().await;

    tracing::info!("StudyDrive server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
