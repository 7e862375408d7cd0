//! Company-capability lookup.
//!
//! Company links and collaborator records live outside the engine. The
//! access resolver only asks: does this actor have an active membership in
//! this company, and with which capabilities?

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::{Actor, ActorId};

/// A named permission granted within a company context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create, edit, move, and delete company files.
    ManageFiles,
    /// See every company file read-only.
    ViewOnly,
    /// See only company files explicitly shared with the actor.
    ViewShared,
    /// Manage the company's collaborators.
    ManageCollaborators,
    /// See company metrics.
    ViewMetrics,
}

/// The capability flags of one membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// See [`Capability::ManageFiles`].
    pub manage_files: bool,
    /// See [`Capability::ViewOnly`].
    pub view_only: bool,
    /// See [`Capability::ViewShared`].
    pub view_shared: bool,
    /// See [`Capability::ManageCollaborators`].
    pub manage_collaborators: bool,
    /// See [`Capability::ViewMetrics`].
    pub view_metrics: bool,
}

impl Capabilities {
    /// A set with every flag raised.
    pub fn all() -> Self {
        Self {
            manage_files: true,
            view_only: true,
            view_shared: true,
            manage_collaborators: true,
            view_metrics: true,
        }
    }

    /// Build a set from a list of capabilities.
    pub fn from_slice(caps: &[Capability]) -> Self {
        caps.iter().fold(Self::default(), |set, cap| set.with(*cap))
    }

    /// Return a copy with `cap` raised.
    pub fn with(mut self, cap: Capability) -> Self {
        match cap {
            Capability::ManageFiles => self.manage_files = true,
            Capability::ViewOnly => self.view_only = true,
            Capability::ViewShared => self.view_shared = true,
            Capability::ManageCollaborators => self.manage_collaborators = true,
            Capability::ViewMetrics => self.view_metrics = true,
        }
        self
    }

    /// Whether `cap` is granted.
    pub fn contains(&self, cap: Capability) -> bool {
        match cap {
            Capability::ManageFiles => self.manage_files,
            Capability::ViewOnly => self.view_only,
            Capability::ViewShared => self.view_shared,
            Capability::ManageCollaborators => self.manage_collaborators,
            Capability::ViewMetrics => self.view_metrics,
        }
    }

    /// Whether the actor sees the whole company project.
    pub fn sees_project(&self) -> bool {
        self.manage_files || self.view_only
    }

    /// Whether the actor sees any company files at all.
    pub fn sees_anything(&self) -> bool {
        self.sees_project() || self.view_shared
    }
}

/// An active membership of an actor in a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// The member.
    pub actor: Actor,
    /// The company.
    pub company_id: ActorId,
    /// Granted capabilities.
    pub capabilities: Capabilities,
}

/// Looks up an actor's membership in a company.
#[async_trait]
pub trait CapabilityLookup: Send + Sync + std::fmt::Debug + 'static {
    /// Return the active membership, or `None` when there is no relationship.
    async fn lookup(&self, actor: &Actor, company_id: ActorId) -> AppResult<Option<Membership>>;
}
