//! Item discriminants for operations that span folders and files.
//!
//! Selection, move, and trash operations address mixed sets of folders and
//! files. A tagged reference keeps the discriminant explicit so callers
//! pattern-match instead of encoding the kind into string prefixes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a tree item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A folder node.
    Folder,
    /// A file attached to a folder (or to the root).
    File,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::File => write!(f, "file"),
        }
    }
}

/// A typed reference to a folder or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    /// The item's identifier.
    pub id: Uuid,
    /// Which table the identifier refers to.
    pub kind: ItemKind,
}

impl ItemRef {
    /// Reference a folder by id.
    pub fn folder(id: Uuid) -> Self {
        Self {
            id,
            kind: ItemKind::Folder,
        }
    }

    /// Reference a file by id.
    pub fn file(id: Uuid) -> Self {
        Self {
            id,
            kind: ItemKind::File,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde_tag() {
        let json = serde_json::to_string(&ItemKind::Folder).expect("serialize");
        assert_eq!(json, "\"folder\"");
        let parsed: ItemKind = serde_json::from_str("\"file\"").expect("deserialize");
        assert_eq!(parsed, ItemKind::File);
    }
}
