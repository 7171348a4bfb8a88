//! Trash-lifecycle summary events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events summarizing bulk trash operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrashEvent {
    /// An owner's trash was emptied.
    Emptied {
        /// The owner whose trash was purged.
        owner_id: Uuid,
        /// Number of items permanently deleted.
        purged: u64,
    },
    /// The retention sweeper purged expired items.
    RetentionSweep {
        /// Number of items permanently deleted across all owners.
        purged: u64,
    },
}
