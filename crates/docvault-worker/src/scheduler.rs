//! Cron scheduler that triggers registered job handlers.

use std::sync::Arc;

use serde_json::Value;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use docvault_core::error::AppError;

use crate::executor::{JobExecutionError, JobExecutor, JobRun};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Executor that runs the triggered jobs
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("job_types", &self.executor.registered_types())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Trigger `job_type` on the six-field cron expression `cron`
    pub async fn schedule(&self, job_type: &str, cron: &str, payload: Value) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{job_type}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let name = job_type.to_string();
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let run = JobRun::new(name.clone(), payload.clone());
            Box::pin(async move {
                run_once(&executor, &run).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{cron}' for {job_type}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {job_type} schedule: {e}")))?;

        tracing::info!(job_type, cron, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

/// Execute one triggered run and log its outcome. Failures wait for the next trigger.
async fn run_once(executor: &JobExecutor, run: &JobRun) {
    match executor.execute(run).await {
        Ok(result) => {
            tracing::info!(run_id = %run.id, job_type = %run.job_type, result = ?result, "Job completed");
        }
        Err(JobExecutionError::Transient(msg)) => {
            tracing::warn!(run_id = %run.id, job_type = %run.job_type, error = %msg, "Job failed (transient)");
        }
        Err(e) => {
            tracing::error!(run_id = %run.id, job_type = %run.job_type, error = %e, "Job failed");
        }
    }
}
