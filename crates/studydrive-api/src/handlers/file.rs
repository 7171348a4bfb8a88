//! File upload, metadata, and download handlers.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use studydrive_core::error::AppError;
use studydrive_entity::file::UpdateFileMeta;
use studydrive_service::file::UploadFileRequest;

use crate::dto::request::{UpdateFileRequest, validated};
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::state::AppState;

/// Query parameters for file listings.
#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    /// Containing folder; absent lists root-level files.
    pub folder_id: Option<Uuid>,
}

/// GET /api/files?folder_id=...
pub async fn list_files(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let files = state
        .file_service
        .list_files(&actor, actor.actor_id, query.folder_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": files })))
}

/// POST /api/files — multipart upload.
///
/// Accepts text fields `folder_id`, `name`, `description`, `content_type`
/// and exactly one binary `file` field. The file's own name is used when
/// no explicit `name` is given.
pub async fn upload_file(
    State(state): State<AppState>,
    actor: Actor,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut folder_id: Option<Uuid> = None;
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Invalid folder_id field: {e}")))?;
                folder_id = Some(
                    text.parse::<Uuid>()
                        .map_err(|_| AppError::validation("Invalid folder_id"))?,
                );
            }
            "name" => {
                name = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Invalid name field: {e}"))
                })?);
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Invalid description field: {e}"))
                })?);
            }
            "content_type" => {
                content_type = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Invalid content_type field: {e}"))
                })?);
            }
            "file" => {
                if name.is_none() {
                    name = field.file_name().map(str::to_string);
                }
                data = Some(field.bytes().await.map_err(|e| {
                    AppError::validation(format!("Failed to read file field: {e}"))
                })?);
            }
            other => {
                return Err(AppError::validation(format!(
                    "Unexpected multipart field '{other}'"
                ))
                .into());
            }
        }
    }

    let data = data.ok_or_else(|| AppError::validation("Missing 'file' field"))?;
    let name = name.ok_or_else(|| AppError::validation("Missing file name"))?;

    let file = state
        .file_service
        .upload(
            &actor,
            UploadFileRequest {
                owner_id: actor.actor_id,
                folder_id,
                name,
                content_type,
                description,
                data,
            },
        )
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.file_service.get_file(&actor, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// PUT /api/files/{id}
pub async fn update_file(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let file = state
        .file_service
        .update_meta(
            &actor,
            id,
            UpdateFileMeta {
                name: req.name,
                description: req.description,
                content_type: req.content_type,
            },
        )
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (file, data) = state.file_service.download(&actor, id).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// DELETE /api/files/{id} — soft-delete.
pub async fn soft_delete_file(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.trash_service.soft_delete_file(&actor, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "File moved to trash" } }),
    ))
}
