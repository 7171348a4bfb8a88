//! The folder/file sum type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use studydrive_core::types::{ItemKind, ItemRef};

use crate::file::File;
use crate::folder::Folder;

/// A folder or file, carried with its discriminant.
///
/// Mixed selections (move, restore, trash listings) operate on this union
/// so every consumer pattern-matches exhaustively instead of sniffing
/// string-prefixed keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    /// A folder node.
    Folder(Folder),
    /// A file record.
    File(File),
}

impl Item {
    /// The item's identifier.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Folder(f) => f.id,
            Self::File(f) => f.id,
        }
    }

    /// The item's discriminant.
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Folder(_) => ItemKind::Folder,
            Self::File(_) => ItemKind::File,
        }
    }

    /// A typed reference to this item.
    pub fn as_ref(&self) -> ItemRef {
        ItemRef {
            id: self.id(),
            kind: self.kind(),
        }
    }

    /// The item's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(f) => &f.name,
            Self::File(f) => &f.name,
        }
    }

    /// The owner of the tree the item belongs to.
    pub fn owner_id(&self) -> Uuid {
        match self {
            Self::Folder(f) => f.owner_id,
            Self::File(f) => f.owner_id,
        }
    }

    /// When the item was soft-deleted, if it is in the trash.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Folder(f) => f.deleted_at,
            Self::File(f) => f.deleted_at,
        }
    }

    /// Who soft-deleted the item, if it is in the trash.
    pub fn deleted_by(&self) -> Option<Uuid> {
        match self {
            Self::Folder(f) => f.deleted_by,
            Self::File(f) => f.deleted_by,
        }
    }

    /// The recorded pre-deletion location (parent folder or containing
    /// folder), if the item is in the trash.
    pub fn original_location(&self) -> Option<Uuid> {
        match self {
            Self::Folder(f) => f.original_parent_id,
            Self::File(f) => f.original_folder_id,
        }
    }
}
