//! Retention sweep job handler.

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use studydrive_service::trash::TrashService;

use crate::executor::{JobExecutionError, JobHandler};

/// Job type string for the retention sweep.
pub const RETENTION_SWEEP: &str = "retention_sweep";

/// Purges trashed items older than the configured retention window.
///
/// The sweep is idempotent and safe to run while interactive restores are
/// in flight: both sides use the same per-row guards, so every contested
/// item has exactly one winner.
#[derive(Debug)]
pub struct RetentionSweepHandler {
    /// Trash lifecycle service.
    trash: TrashService,
}

impl RetentionSweepHandler {
    /// Create a new retention sweep handler.
    pub fn new(trash: TrashService) -> Self {
        Self { trash }
    }
}

#[async_trait]
impl JobHandler for RetentionSweepHandler {
    fn job_type(&self) -> &str {
        RETENTION_SWEEP
    }

    async fn execute(&self) -> Result<Option<Value>, JobExecutionError> {
        tracing::info!("Running retention sweep");

        let purged = self
            .trash
            .purge_expired()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Retention sweep failed: {e}")))?;

        tracing::info!("Retention sweep removed {} expired items", purged);

        Ok(Some(serde_json::json!({
            "task": RETENTION_SWEEP,
            "items_purged": purged,
        })))
    }
}
