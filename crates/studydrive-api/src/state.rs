//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use studydrive_core::config::AppConfig;
use studydrive_core::events::EventBus;
use studydrive_service::file::FileService;
use studydrive_service::folder::{FolderService, TreeService};
use studydrive_service::reparent::ReparentService;
use studydrive_service::trash::TrashService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped (or internally shared) for cheap cloning
/// across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health checks).
    pub db_pool: PgPool,
    /// Domain event bus.
    pub events: EventBus,
    /// Path resolution and breadcrumbs.
    pub tree: Arc<TreeService>,
    /// Folder CRUD service.
    pub folder_service: Arc<FolderService>,
    /// File service.
    pub file_service: Arc<FileService>,
    /// Batch move engine.
    pub reparent_service: Arc<ReparentService>,
    /// Trash lifecycle service.
    pub trash_service: Arc<TrashService>,
}
