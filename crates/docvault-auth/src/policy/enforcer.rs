//! The mutation predicate and the visibility rule.
//!
//! Both are pure functions of the actor, the node and the facts gathered
//! about them, so batch callers can evaluate them without further lookups.

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::Capabilities;
use docvault_core::types::Actor;
use docvault_entity::node::Node;
use docvault_entity::share::Share;

use super::operation::Operation;
use crate::capability::CapabilityResolver;

/// What is known about an actor's relationship to one node.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessFacts<'a> {
    /// The edge on the node naming the actor, if any.
    pub share: Option<&'a Share>,
    /// The actor's capabilities in the node's company, if any.
    pub capabilities: Option<Capabilities>,
}

impl<'a> AccessFacts<'a> {
    /// Facts from an optional edge and optional capabilities.
    pub fn new(share: Option<&'a Share>, capabilities: Option<Capabilities>) -> Self {
        Self {
            share,
            capabilities,
        }
    }
}

/// Evaluates `can_mutate` and `editable` for every mutating operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationPolicy;

impl MutationPolicy {
    /// Create the policy.
    pub fn new() -> Self {
        Self
    }

    /// Whether `actor` is the company account of the node's company.
    pub fn is_company_admin(&self, actor: &Actor, node: &Node) -> bool {
        node.company_id
            .is_some_and(|company| CapabilityResolver::is_company_admin(actor, company))
    }

    /// Owner, company admin, an edge with `edit_allowed`, or `manage_files` in the node's company.
    pub fn editable(&self, actor: &Actor, node: &Node, facts: &AccessFacts<'_>) -> bool {
        node.is_owned_by(actor)
            || self.is_company_admin(actor, node)
            || facts.share.is_some_and(|s| s.edit_allowed)
            || facts.capabilities.is_some_and(|c| c.manage_files)
    }

    /// Whether `actor` can see `node` at all.
    pub fn can_view(&self, actor: &Actor, node: &Node, facts: &AccessFacts<'_>) -> bool {
        node.is_owned_by(actor)
            || self.is_company_admin(actor, node)
            || facts.share.is_some()
            || facts.capabilities.is_some_and(|c| c.sees_project())
    }

    /// The single predicate gating every mutating operation.
    pub fn can_mutate(
        &self,
        actor: &Actor,
        node: &Node,
        operation: Operation,
        facts: &AccessFacts<'_>,
    ) -> bool {
        match operation {
            Operation::TransferOwnership => {
                node.is_owned_by(actor) || self.is_company_admin(actor, node)
            }
            Operation::CreateChild => node.is_folder() && self.editable(actor, node, facts),
            Operation::Move
            | Operation::Update
            | Operation::Delete
            | Operation::Restore
            | Operation::Purge
            | Operation::Share => self.editable(actor, node, facts),
        }
    }

    /// [`can_mutate`](Self::can_mutate) as a `Forbidden` error.
    pub fn require(
        &self,
        actor: &Actor,
        node: &Node,
        operation: Operation,
        facts: &AccessFacts<'_>,
    ) -> AppResult<()> {
        if self.can_mutate(actor, node, operation, facts) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "{actor} may not {operation} node {}",
                node.id
            )))
        }
    }
}
