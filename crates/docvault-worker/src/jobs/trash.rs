//! Trash retention: purges nodes that have sat in the trash too long.

use async_trait::async_trait;
use serde_json::Value;

use docvault_service::TrashService;
use docvault_service::trash::TrashFilter;

use crate::executor::{JobExecutionError, JobHandler, JobRun};

/// Job type of the retention sweep.
pub const TRASH_RETENTION_JOB: &str = "trash_retention";

/// Purges every trashed node older than the retention period.
///
/// A run payload of `{"retention_days": n}` overrides the configured period.
#[derive(Debug, Clone)]
pub struct TrashRetentionHandler {
    /// Trash service.
    trash: TrashService,
    /// Configured retention period.
    retention_days: u32,
}

impl TrashRetentionHandler {
    /// Create a handler purging nodes trashed more than `retention_days` ago.
    pub fn new(trash: TrashService, retention_days: u32) -> Self {
        Self {
            trash,
            retention_days,
        }
    }

    fn retention_for(&self, run: &JobRun) -> Result<u32, JobExecutionError> {
        match run.payload.get("retention_days") {
            None | Some(Value::Null) => Ok(self.retention_days),
            Some(value) => value
                .as_u64()
                .and_then(|days| u32::try_from(days).ok())
                .ok_or_else(|| {
                    JobExecutionError::Permanent(format!("Invalid retention_days: {value}"))
                }),
        }
    }
}

#[async_trait]
impl JobHandler for TrashRetentionHandler {
    fn job_type(&self) -> &str {
        TRASH_RETENTION_JOB
    }

    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        let retention_days = self.retention_for(run)?;
        tracing::info!(run_id = %run.id, retention_days, "Running trash retention");

        let filter = TrashFilter {
            older_than_days: Some(retention_days),
            ..TrashFilter::default()
        };
        let summary = self
            .trash
            .sweep(&filter)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Trash sweep failed: {e}")))?;

        tracing::info!(
            run_id = %run.id,
            roots = summary.roots,
            nodes = summary.nodes,
            "Trash retention finished"
        );
        Ok(Some(serde_json::json!({
            "purged": summary.nodes,
            "roots": summary.roots,
            "retention_days": retention_days,
        })))
    }
}
