//! Mutating operations subject to the policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A mutating operation on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a child under the node.
    CreateChild,
    /// Move the node.
    Move,
    /// Edit attributes or replace content.
    Update,
    /// Put the node in the trash.
    Delete,
    /// Bring the node back from the trash.
    Restore,
    /// Remove the node for good.
    Purge,
    /// Grant, revoke or list share edges.
    Share,
    /// Hand the node to another owner.
    TransferOwnership,
}

impl Operation {
    /// Return the operation as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateChild => "create_child",
            Self::Move => "move",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Restore => "restore",
            Self::Purge => "purge",
            Self::Share => "share",
            Self::TransferOwnership => "transfer_ownership",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
