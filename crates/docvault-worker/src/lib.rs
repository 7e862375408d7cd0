//! Scheduled background jobs for DocVault.
//!
//! This crate provides:
//! - A job executor that dispatches runs to the registered handler
//! - A cron scheduler that triggers handlers on their schedule
//! - The trash retention job

pub mod executor;
pub mod jobs;
pub mod scheduler;

use std::sync::Arc;

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_service::TrashService;

use jobs::trash::{TRASH_RETENTION_JOB, TrashRetentionHandler};

pub use executor::{JobExecutionError, JobExecutor, JobHandler, JobRun};
pub use scheduler::CronScheduler;

/// Build and start the scheduler for `config`, or `None` when nothing is scheduled.
pub async fn start(config: &AppConfig, trash: TrashService) -> Result<Option<CronScheduler>, AppError> {
    if !config.worker.enabled || !config.trash.sweep_enabled {
        tracing::info!(
            worker_enabled = config.worker.enabled,
            sweep_enabled = config.trash.sweep_enabled,
            "Background jobs disabled"
        );
        return Ok(None);
    }

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(TrashRetentionHandler::new(
        trash,
        config.trash.retention_days,
    )));

    let scheduler = CronScheduler::new(Arc::new(executor)).await?;
    scheduler
        .schedule(TRASH_RETENTION_JOB, &config.trash.sweep_cron, serde_json::Value::Null)
        .await?;
    scheduler.start().await?;
    Ok(Some(scheduler))
}
