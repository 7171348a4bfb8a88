//! Mixed-selection handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::request::{MoveItemsRequest, validated};
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::state::AppState;

/// PUT /api/items/move — batch reparent with partial-success reporting.
pub async fn move_items(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<MoveItemsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let outcome = state
        .reparent_service
        .move_items(&actor, &req.items, req.destination_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": outcome })))
}
