//! File-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to file operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FileEvent {
    /// A file record was created (content already in the blob store).
    Created {
        /// The file ID.
        file_id: Uuid,
        /// The containing folder (None for root level).
        folder_id: Option<Uuid>,
        /// The owner of the tree.
        owner_id: Uuid,
        /// The file name.
        name: String,
        /// The file size in bytes.
        size_bytes: i64,
    },
    /// File metadata was updated (name, description, content type).
    Updated {
        /// The file ID.
        file_id: Uuid,
        /// Fields that changed.
        changed_fields: Vec<String>,
    },
    /// A file was moved to another folder.
    Moved {
        /// The file ID.
        file_id: Uuid,
        /// The source folder.
        from_folder_id: Option<Uuid>,
        /// The destination folder.
        to_folder_id: Option<Uuid>,
    },
    /// A file was soft-deleted.
    SoftDeleted {
        /// The file ID.
        file_id: Uuid,
    },
    /// A file was restored from the trash.
    Restored {
        /// The file ID.
        file_id: Uuid,
        /// The folder it was reattached to (None for root level).
        folder_id: Option<Uuid>,
    },
    /// A file was permanently purged.
    Purged {
        /// The file ID.
        file_id: Uuid,
    },
}
