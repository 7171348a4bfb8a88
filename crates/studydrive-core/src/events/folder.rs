//! Folder-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to folder operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FolderEvent {
    /// A folder was created.
    Created {
        /// The folder ID.
        folder_id: Uuid,
        /// The parent folder (None for root level).
        parent_id: Option<Uuid>,
        /// The owner of the tree.
        owner_id: Uuid,
        /// The folder name.
        name: String,
    },
    /// A folder was renamed.
    Renamed {
        /// The folder ID.
        folder_id: Uuid,
        /// The new name.
        name: String,
    },
    /// A folder was moved to a new parent.
    Moved {
        /// The folder ID.
        folder_id: Uuid,
        /// The previous parent.
        from_parent_id: Option<Uuid>,
        /// The new parent.
        to_parent_id: Option<Uuid>,
    },
    /// A folder (and its live contents) was soft-deleted.
    SoftDeleted {
        /// The folder ID.
        folder_id: Uuid,
        /// Number of items stamped in the cascade, the folder included.
        cascade_size: usize,
    },
    /// A folder was restored from the trash.
    Restored {
        /// The folder ID.
        folder_id: Uuid,
        /// The parent it was reattached to (None for root level).
        parent_id: Option<Uuid>,
    },
    /// A folder was permanently purged.
    Purged {
        /// The folder ID.
        folder_id: Uuid,
    },
}
