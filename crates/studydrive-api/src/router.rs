//! Route definitions for the StudyDrive HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(folder_routes())
        .merge(file_routes())
        .merge(item_routes())
        .merge(trash_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Folder CRUD and navigation.
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders/roots", get(handlers::folder::list_roots))
        .route("/folders", post(handlers::folder::create_folder))
        .route("/folders/{id}", get(handlers::folder::get_folder))
        .route("/folders/{id}", put(handlers::folder::rename_folder))
        .route(
            "/folders/{id}",
            delete(handlers::folder::soft_delete_folder),
        )
        .route(
            "/folders/{id}/children",
            get(handlers::folder::list_children),
        )
        .route(
            "/folders/{id}/breadcrumbs",
            get(handlers::folder::breadcrumbs),
        )
}

/// File CRUD, upload, download.
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::file::list_files))
        .route("/files", post(handlers::file::upload_file))
        .route("/files/{id}", get(handlers::file::get_file))
        .route("/files/{id}", put(handlers::file::update_file))
        .route("/files/{id}", delete(handlers::file::soft_delete_file))
        .route("/files/{id}/download", get(handlers::file::download_file))
}

/// Mixed-selection operations.
fn item_routes() -> Router<AppState> {
    Router::new().route("/items/move", put(handlers::item::move_items))
}

/// Trash listing, restore, and purges.
fn trash_routes() -> Router<AppState> {
    Router::new()
        .route("/trash", get(handlers::trash::list_trash))
        .route("/trash/restore", post(handlers::trash::restore_items))
        .route(
            "/trash/folders/{id}/restore",
            post(handlers::trash::restore_folder_with_contents),
        )
        .route("/trash/empty", post(handlers::trash::empty_trash))
        .route("/trash/{kind}/{id}", delete(handlers::trash::purge_item))
        .route(
            "/admin/trash/purge-expired",
            post(handlers::trash::purge_expired),
        )
}

/// Liveness/readiness.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
