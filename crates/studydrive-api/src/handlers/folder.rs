//! Folder CRUD and navigation handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use studydrive_service::folder::CreateFolderRequest as SvcCreateFolder;

use crate::dto::request::{CreateFolderRequest, RenameRequest, validated};
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::state::AppState;

/// GET /api/folders/roots
pub async fn list_roots(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folders = state
        .folder_service
        .list_roots(&actor, actor.actor_id)
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": folders }),
    ))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let folder = state
        .folder_service
        .create_folder(
            &actor,
            SvcCreateFolder {
                owner_id: actor.actor_id,
                parent_id: req.parent_id,
                name: req.name,
            },
        )
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folder_service.get_folder(&actor, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// PUT /api/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let folder = state
        .folder_service
        .rename_folder(&actor, id, &req.name)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// GET /api/folders/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let children = state.folder_service.list_children(&actor, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": children }),
    ))
}

/// GET /api/folders/{id}/breadcrumbs
pub async fn breadcrumbs(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let crumbs = state.tree.live_breadcrumbs(Some(id)).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": crumbs })))
}

/// DELETE /api/folders/{id} — soft-delete the folder with its contents.
pub async fn soft_delete_folder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state.trash_service.soft_delete_folder(&actor, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "deleted": deleted } }),
    ))
}
