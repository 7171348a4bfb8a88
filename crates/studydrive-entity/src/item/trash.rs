//! Trash listing entries.

use serde::{Deserialize, Serialize};

use super::model::Item;

/// One row of a trash listing.
///
/// The original-location path is resolved through deleted ancestors so the
/// entry stays meaningful even when the containing folders are themselves
/// in the trash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashEntry {
    /// The trashed item.
    pub item: Item,
    /// Human-readable path of the item's recorded original location
    /// (`"Reports / 2024"`; empty for root level).
    pub original_path: String,
}
