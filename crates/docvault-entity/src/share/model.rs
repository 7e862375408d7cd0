//! Share edge entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docvault_core::types::{Actor, ActorId, ActorKind, NodeId, ShareId};

/// A directed grant of access on one node.
///
/// At most one edge exists per `(node_id, grantee)`. Re-granting updates
/// `edit_allowed` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Share {
    /// Unique share identifier.
    pub id: ShareId,
    /// The shared node.
    pub node_id: NodeId,
    /// Who receives access.
    pub grantee_id: ActorId,
    /// Kind of the grantee.
    pub grantee_kind: ActorKind,
    /// Who granted access.
    pub grantor_id: ActorId,
    /// Kind of the grantor.
    pub grantor_kind: ActorKind,
    /// Whether the grantee may mutate the node.
    pub edit_allowed: bool,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}

impl Share {
    /// The grantee.
    pub fn grantee(&self) -> Actor {
        Actor::new(self.grantee_id, self.grantee_kind)
    }

    /// The grantor.
    pub fn grantor(&self) -> Actor {
        Actor::new(self.grantor_id, self.grantor_kind)
    }

    /// Whether the edge names `actor` as grantee.
    pub fn is_for(&self, actor: &Actor) -> bool {
        self.grantee_id == actor.id && self.grantee_kind == actor.kind
    }

    /// The same grant, carried onto another node.
    pub fn grant(&self) -> ShareGrant {
        ShareGrant {
            grantor: self.grantor(),
            grantee: self.grantee(),
            edit_allowed: self.edit_allowed,
        }
    }
}

/// The node-independent part of a share edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareGrant {
    /// Who grants access.
    pub grantor: Actor,
    /// Who receives access.
    pub grantee: Actor,
    /// Whether the grantee may mutate.
    pub edit_allowed: bool,
}

impl ShareGrant {
    /// Create a new grant.
    pub fn new(grantor: Actor, grantee: Actor, edit_allowed: bool) -> Self {
        Self {
            grantor,
            grantee,
            edit_allowed,
        }
    }

    /// Materialize the grant as an edge on `node_id`.
    pub fn into_share(self, id: ShareId, node_id: NodeId, now: DateTime<Utc>) -> Share {
        Share {
            id,
            node_id,
            grantee_id: self.grantee.id,
            grantee_kind: self.grantee.kind,
            grantor_id: self.grantor.id,
            grantor_kind: self.grantor.kind,
            edit_allowed: self.edit_allowed,
            created_at: now,
        }
    }
}
