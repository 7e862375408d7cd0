//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::events::AuditEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::AuditSink;
use docvault_core::types::NodeId;
use docvault_entity::audit::AuditLogEntry;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn create(&self, entry: &AuditLogEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log (id, node_id, action, actor_id, actor_kind, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.node_id)
        .bind(&entry.action)
        .bind(entry.actor_id)
        .bind(entry.actor_kind)
        .bind(&entry.details)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))?;
        Ok(())
    }

    /// History of one node, most recent first.
    pub async fn find_by_node(
        &self,
        node_id: NodeId,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE node_id = $1 \
             ORDER BY created_at DESC, id DESC OFFSET $2 LIMIT $3",
        )
        .bind(node_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list audit entries", e)
        })
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn record(&self, event: &AuditEvent) -> AppResult<()> {
        self.create(&AuditLogEntry::from(event)).await
    }

    async fn history(
        &self,
        node_id: NodeId,
        offset: usize,
        limit: usize,
    ) -> AppResult<Vec<AuditEvent>> {
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.find_by_node(node_id, offset, limit)
            .await?
            .into_iter()
            .map(AuditLogEntry::into_event)
            .collect()
    }
}
