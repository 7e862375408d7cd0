//! Audit and deadline fan-out after a unit of work commits.
//!
//! Neither path can fail the operation that triggered it: errors are logged
//! at `warn` and dropped.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

use docvault_core::events::{AuditEvent, NodeAction};
use docvault_core::traits::{AuditSink, DeadlineNotifier};
use docvault_core::types::NodeId;

use crate::context::RequestContext;

/// Emits one audit event per committed mutation.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    /// Where events go.
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    /// Creates a recorder over `sink`.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Records an event for `node_id`. Sink failures are swallowed.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        action: NodeAction,
        details: Value,
    ) {
        let event = AuditEvent::new(node_id, action, ctx.actor, details);
        if let Err(e) = self.sink.record(&event).await {
            warn!(
                node_id = %node_id,
                action = %action,
                error = %e,
                "Failed to record audit event"
            );
        }
    }
}

/// Forwards expiry changes and removals to the deadline notifier.
#[derive(Debug, Clone)]
pub struct DeadlineRelay {
    /// External notifier.
    notifier: Arc<dyn DeadlineNotifier>,
}

impl DeadlineRelay {
    /// Creates a relay over `notifier`.
    pub fn new(notifier: Arc<dyn DeadlineNotifier>) -> Self {
        Self { notifier }
    }

    /// Reports a new expiry date.
    pub async fn expiry_changed(&self, node_id: NodeId, expires_on: Option<NaiveDate>) {
        if let Err(e) = self.notifier.expiry_changed(node_id, expires_on).await {
            warn!(node_id = %node_id, error = %e, "Deadline notifier rejected expiry change");
        }
    }

    /// Reports purged nodes.
    pub async fn nodes_removed(&self, node_ids: &[NodeId]) {
        if node_ids.is_empty() {
            return;
        }
        if let Err(e) = self.notifier.nodes_removed(node_ids).await {
            warn!(count = node_ids.len(), error = %e, "Deadline notifier rejected removal");
        }
    }
}
