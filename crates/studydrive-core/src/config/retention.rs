//! Trash retention configuration.

use serde::{Deserialize, Serialize};

/// Retention policy for soft-deleted items.
///
/// Items whose `deleted_at` is older than the window become eligible for
/// automatic permanent purge by the retention sweeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Number of days a trashed item remains recoverable.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

fn default_window_days() -> i64 {
    30
}
