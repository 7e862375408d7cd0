//! Follower entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docvault_core::types::{Actor, ActorId, ActorKind, FollowerId, NodeId};

/// Days before expiry at which a follower is alerted, unless they choose otherwise.
pub const DEFAULT_DAYS_BEFORE_ALERT: i32 = 7;

/// An actor's subscription to a file's expiry alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Follower {
    /// Unique follower identifier.
    pub id: FollowerId,
    /// The followed file.
    pub node_id: NodeId,
    /// Following actor.
    pub actor_id: ActorId,
    /// Kind of the following actor.
    pub actor_kind: ActorKind,
    /// Lead time of the expiry alert.
    pub days_before_alert: i32,
    /// Whether to alert on expiry.
    pub alert_on_expiry: bool,
    /// Inactive records are kept so following again reactivates them.
    pub active: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Follower {
    /// The following actor.
    pub fn actor(&self) -> Actor {
        Actor::new(self.actor_id, self.actor_kind)
    }

    /// Whether this record belongs to `actor`.
    pub fn is_for(&self, actor: &Actor) -> bool {
        self.actor_id == actor.id && self.actor_kind == actor.kind
    }
}

/// Alert preferences supplied when following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowPreferences {
    /// Lead time in days.
    pub days_before_alert: i32,
    /// Whether to alert on expiry.
    pub alert_on_expiry: bool,
}

impl Default for FollowPreferences {
    fn default() -> Self {
        Self {
            days_before_alert: DEFAULT_DAYS_BEFORE_ALERT,
            alert_on_expiry: true,
        }
    }
}
