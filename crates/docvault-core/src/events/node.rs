//! Node audit events.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::types::{Actor, NodeId};

/// What happened to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    /// The node was created.
    Created,
    /// The node changed parent.
    Moved,
    /// The node's name changed.
    Renamed,
    /// Other attributes changed.
    Edited,
    /// The file content was replaced.
    VersionUploaded,
    /// The node went to the trash.
    Deleted,
    /// The node came back from the trash.
    Restored,
    /// The node was purged.
    PermanentlyDeleted,
    /// A share edge was granted or updated.
    Shared,
    /// A share edge was removed.
    Unshared,
}

impl NodeAction {
    /// Return the action as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Moved => "moved",
            Self::Renamed => "renamed",
            Self::Edited => "edited",
            Self::VersionUploaded => "version_uploaded",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
            Self::PermanentlyDeleted => "permanently_deleted",
            Self::Shared => "shared",
            Self::Unshared => "unshared",
        }
    }
}

impl fmt::Display for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NodeAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "moved" => Ok(Self::Moved),
            "renamed" => Ok(Self::Renamed),
            "edited" => Ok(Self::Edited),
            "version_uploaded" => Ok(Self::VersionUploaded),
            "deleted" => Ok(Self::Deleted),
            "restored" => Ok(Self::Restored),
            "permanently_deleted" => Ok(Self::PermanentlyDeleted),
            "shared" => Ok(Self::Shared),
            "unshared" => Ok(Self::Unshared),
            _ => Err(AppError::validation(format!("Unknown node action: '{s}'"))),
        }
    }
}

/// A structured audit record for one mutating operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the operation committed.
    pub timestamp: DateTime<Utc>,
    /// The node the operation targeted.
    pub node_id: NodeId,
    /// What happened.
    pub action: NodeAction,
    /// Who did it.
    pub actor: Actor,
    /// Action-specific details (previous parent, changed fields, grantee...).
    pub details: serde_json::Value,
}

impl AuditEvent {
    /// Create a new audit event stamped with the current time.
    pub fn new(node_id: NodeId, action: NodeAction, actor: Actor, details: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            node_id,
            action,
            actor,
            details,
        }
    }
}
