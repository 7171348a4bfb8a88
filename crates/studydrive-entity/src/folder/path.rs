//! Breadcrumb chains for hierarchical display.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Folder;

/// One segment of an ancestor chain, ordered root-first.
///
/// Trash views render paths through deleted ancestors, so each crumb
/// carries a `deleted` flag; live navigation filters on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Whether this ancestor is currently in the trash.
    pub deleted: bool,
}

impl Breadcrumb {
    /// Build a crumb from a folder record.
    pub fn from_folder(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            deleted: folder.is_deleted(),
        }
    }
}

/// Render a breadcrumb chain as a human-readable path (`A / B / C`).
///
/// An empty chain (the root) renders as an empty string.
pub fn render_path(crumbs: &[Breadcrumb]) -> String {
    crumbs
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crumb(name: &str) -> Breadcrumb {
        Breadcrumb {
            id: Uuid::new_v4(),
            name: name.to_string(),
            deleted: false,
        }
    }

    #[test]
    fn test_render_path() {
        let crumbs = vec![crumb("Reports"), crumb("2024"), crumb("Q1")];
        assert_eq!(render_path(&crumbs), "Reports / 2024 / Q1");
    }

    #[test]
    fn test_render_empty_chain() {
        assert_eq!(render_path(&[]), "");
    }
}
