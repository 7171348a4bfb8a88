//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use studydrive_core::error::AppError;
use studydrive_core::types::ItemRef;

/// Run `validator` rules, folding failures into a `Validation` error.
pub fn validated<T: Validate>(req: T) -> Result<T, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;
    Ok(req)
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Parent folder ID (absent for root level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Rename request (folders).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameRequest {
    /// The new name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Update file metadata request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateFileRequest {
    /// New name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New content-type label.
    pub content_type: Option<String>,
}

/// Batch move request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveItemsRequest {
    /// The selected items.
    #[validate(length(min = 1))]
    pub items: Vec<ItemRef>,
    /// Destination folder (absent for root level).
    pub destination_id: Option<Uuid>,
}

/// Bulk restore request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestoreItemsRequest {
    /// The selected trashed items.
    #[validate(length(min = 1))]
    pub items: Vec<ItemRef>,
}
