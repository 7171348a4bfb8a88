//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in a student's virtual filesystem.
///
/// The live subset (`deleted_at IS NULL`), linked by `parent_id`, forms a
/// forest per owner. Soft-deleted folders keep their `parent_id` so a
/// trashed subtree stays reconstructible; `original_parent_id` records
/// where the folder was attached at the moment of deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Parent folder ID (None for root-level folders).
    pub parent_id: Option<Uuid>,
    /// Folder name. Unique among live siblings of the same owner.
    pub name: String,
    /// The student whose tree this folder belongs to. Immutable.
    pub owner_id: Uuid,
    /// Optimistic-concurrency guard, bumped on every mutation.
    pub version: i64,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the folder was soft-deleted (None = live).
    pub deleted_at: Option<DateTime<Utc>>,
    /// Actor who soft-deleted the folder. Set iff `deleted_at` is set.
    pub deleted_by: Option<Uuid>,
    /// Snapshot of `parent_id` at the moment of deletion. May be None for
    /// a folder deleted at root level.
    pub original_parent_id: Option<Uuid>,
}

impl Folder {
    /// Check if this is a root-level folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if the folder is currently in the trash.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Parent folder (None for root level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// The owner of the tree.
    pub owner_id: Uuid,
}
