//! Sinks used when no external collaborator is configured.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info};

use docvault_core::events::AuditEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::{AuditSink, DeadlineNotifier};
use docvault_core::types::NodeId;

/// Writes audit events to the log and keeps them in memory for history reads.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl MemoryAuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn record(&self, event: &AuditEvent) -> AppResult<()> {
        info!(
            target: "docvault::audit",
            event_id = %event.id,
            node_id = %event.node_id,
            action = %event.action,
            actor = %event.actor,
            details = %event.details,
            "Node audit event"
        );
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn history(
        &self,
        node_id: NodeId,
        offset: usize,
        limit: usize,
    ) -> AppResult<Vec<AuditEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .rev()
            .filter(|e| e.node_id == node_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Logs deadline changes instead of scheduling notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDeadlineNotifier;

#[async_trait]
impl DeadlineNotifier for LoggingDeadlineNotifier {
    async fn expiry_changed(&self, node_id: NodeId, expires_on: Option<NaiveDate>) -> AppResult<()> {
        debug!(node_id = %node_id, expires_on = ?expires_on, "Expiry date changed");
        Ok(())
    }

    async fn nodes_removed(&self, node_ids: &[NodeId]) -> AppResult<()> {
        debug!(count = node_ids.len(), "Stopped tracking purged nodes");
        Ok(())
    }
}
