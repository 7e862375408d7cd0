//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use docvault_core::events::{AuditEvent, NodeAction};
use docvault_core::result::AppResult;
use docvault_core::types::{Actor, ActorId, ActorKind, NodeId};

/// An immutable audit log row recording one node mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The node the action applied to.
    pub node_id: NodeId,
    /// The action that was performed (e.g. `"moved"`, `"permanently_deleted"`).
    pub action: String,
    /// The acting actor.
    pub actor_id: ActorId,
    /// Kind of the acting actor.
    pub actor_kind: ActorKind,
    /// Action-specific details.
    pub details: serde_json::Value,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

impl From<&AuditEvent> for AuditLogEntry {
    fn from(event: &AuditEvent) -> Self {
        Self {
            id: event.id,
            node_id: event.node_id,
            action: event.action.as_str().to_string(),
            actor_id: event.actor.id,
            actor_kind: event.actor.kind,
            details: event.details.clone(),
            created_at: event.timestamp,
        }
    }
}

impl AuditLogEntry {
    /// Convert the row back into the event it was written from.
    pub fn into_event(self) -> AppResult<AuditEvent> {
        Ok(AuditEvent {
            id: self.id,
            timestamp: self.created_at,
            node_id: self.node_id,
            action: self.action.parse::<NodeAction>()?,
            actor: Actor::new(self.actor_id, self.actor_kind),
            details: self.details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_converts_back_to_event() {
        let actor = Actor::new(ActorId(42), ActorKind::Personal);
        let event = AuditEvent::new(NodeId(3), NodeAction::Moved, actor, json!({ "to": 1 }));
        let back = AuditLogEntry::from(&event).into_event().unwrap();
        assert_eq!(back.id, event.id);
        assert_eq!(back.action, NodeAction::Moved);
        assert_eq!(back.actor, actor);
        assert_eq!(back.details, json!({ "to": 1 }));

        let mut row = AuditLogEntry::from(&event);
        row.action = "teleported".to_string();
        assert!(row.into_event().is_err());
    }
}
