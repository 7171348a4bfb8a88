//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use studydrive_core::error::AppError;

use crate::executor::JobExecutor;
use crate::jobs::retention::RETENTION_SWEEP;

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Executor the scheduled ticks dispatch into.
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the retention sweep on the given cron expression.
    pub async fn register_retention_sweep(&self, cron_expr: &str) -> Result<(), AppError> {
        let executor = Arc::clone(&self.executor);
        let job = CronJob::new_async(cron_expr, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            Box::pin(async move {
                match executor.execute(RETENTION_SWEEP).await {
                    Ok(summary) => {
                        tracing::debug!(?summary, "Retention sweep tick finished");
                    }
                    Err(e) => {
                        tracing::error!("Retention sweep tick failed: {}", e);
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create retention_sweep schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add retention_sweep schedule: {}", e))
        })?;

        tracing::info!("Registered: retention_sweep ({})", cron_expr);
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.scheduler
            .clone()
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{JobExecutionError, JobHandler};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingHandler {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl JobHandler for CountingHandler {
        fn job_type(&self) -> &str {
            "counting"
        }

        async fn execute(&self) -> Result<Option<serde_json::Value>, JobExecutionError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_executor_dispatches_by_type() {
        let handler = Arc::new(CountingHandler::default());
        let mut executor = JobExecutor::new();
        executor.register(handler.clone());

        assert!(executor.has_handler("counting"));
        executor.execute("counting").await.unwrap();
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_job_type_is_permanent_failure() {
        let executor = JobExecutor::new();
        let err = executor.execute("nope").await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
