//! Audit log sink.

use async_trait::async_trait;

use crate::events::AuditEvent;
use crate::result::AppResult;
use crate::types::NodeId;

/// Receives one event per committed mutating operation.
///
/// Callers treat `record` failures as non-fatal: they are logged and swallowed.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Persist or forward an event.
    async fn record(&self, event: &AuditEvent) -> AppResult<()>;

    /// Recorded events of one node, most recent first.
    async fn history(
        &self,
        node_id: NodeId,
        offset: usize,
        limit: usize,
    ) -> AppResult<Vec<AuditEvent>>;
}
