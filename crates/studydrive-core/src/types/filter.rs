//! Filter types for trash listings.

use serde::{Deserialize, Serialize};

use crate::types::item::ItemKind;

/// Filter applied to a trash listing.
///
/// Both fields are optional; an empty filter matches every trashed item in
/// the owner's scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrashFilter {
    /// Case-insensitive substring match on the item name.
    #[serde(default)]
    pub name_contains: Option<String>,
    /// Restrict to folders or files only.
    #[serde(default)]
    pub kind: Option<ItemKind>,
}

impl TrashFilter {
    /// Whether an item of the given kind and name passes the filter.
    pub fn matches(&self, kind: ItemKind, name: &str) -> bool {
        if let Some(wanted) = self.kind
            && wanted != kind
        {
            return false;
        }
        match &self.name_contains {
            Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = TrashFilter::default();
        assert!(filter.matches(ItemKind::Folder, "Reports"));
        assert!(filter.matches(ItemKind::File, "q1.pdf"));
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let filter = TrashFilter {
            name_contains: Some("rep".to_string()),
            kind: None,
        };
        assert!(filter.matches(ItemKind::Folder, "Reports"));
        assert!(!filter.matches(ItemKind::File, "q1.pdf"));
    }

    #[test]
    fn test_kind_filter() {
        let filter = TrashFilter {
            name_contains: None,
            kind: Some(ItemKind::File),
        };
        assert!(!filter.matches(ItemKind::Folder, "Reports"));
        assert!(filter.matches(ItemKind::File, "Reports"));
    }
}
