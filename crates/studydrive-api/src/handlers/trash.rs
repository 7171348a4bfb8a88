//! Trash listing, restore, and purge handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_core::types::{ItemKind, ItemRef, TrashFilter};

use crate::dto::request::{RestoreItemsRequest, validated};
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::state::AppState;

/// GET /api/trash?name_contains=...&kind=...
pub async fn list_trash(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<TrashFilter>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entries = state
        .trash_service
        .list_trash(&actor, actor.actor_id, &filter)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entries })))
}

/// POST /api/trash/restore — bulk restore of selected items.
pub async fn restore_items(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<RestoreItemsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let outcome = state.trash_service.restore_items(&actor, &req.items).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": outcome })))
}

/// POST /api/trash/folders/{id}/restore — restore a folder with contents.
pub async fn restore_folder_with_contents(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let restored = state
        .trash_service
        .restore_folder_with_contents(&actor, id)
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "restored": restored } }),
    ))
}

/// POST /api/trash/empty — permanently purge the caller's trash.
///
/// Irreversible. The confirmation dialog is the caller's contract; once
/// this endpoint is hit the purge runs unconditionally.
pub async fn empty_trash(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<serde_json::Value>, ApiError> {
    let purged = state
        .trash_service
        .empty_trash(&actor, actor.actor_id)
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "purged": purged } }),
    ))
}

/// DELETE /api/trash/{kind}/{id} — permanently purge one item.
pub async fn purge_item(
    State(state): State<AppState>,
    actor: Actor,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind = match kind.as_str() {
        "folder" => ItemKind::Folder,
        "file" => ItemKind::File,
        other => {
            return Err(AppError::validation(format!("Unknown item kind '{other}'")).into());
        }
    };
    let purged = state
        .trash_service
        .purge_item(&actor, ItemRef { id, kind })
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "purged": purged } }),
    ))
}

/// POST /api/admin/trash/purge-expired — run the retention sweep now.
pub async fn purge_expired(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !actor.is_admin() {
        return Err(AppError::authorization(
            "Only admins may trigger a retention sweep",
        )
        .into());
    }
    let purged = state.trash_service.purge_expired().await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "purged": purged } }),
    ))
}
