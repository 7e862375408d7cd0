//! Gathers access facts for one node and applies the mutation policy.

use tracing::debug;

use docvault_auth::{AccessFacts, CapabilityResolver, MutationPolicy, Operation};
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::Capabilities;
use docvault_core::types::{Actor, ActorId};
use docvault_database::UnitOfWork;
use docvault_entity::node::Node;
use docvault_entity::share::Share;

/// Owned facts about an actor's relationship to one node.
#[derive(Debug, Clone, Default)]
pub struct NodeAccess {
    /// The edge on the node naming the actor.
    pub share: Option<Share>,
    /// Capabilities in the node's company.
    pub capabilities: Option<Capabilities>,
}

impl NodeAccess {
    /// Borrowed view for the policy.
    pub fn facts(&self) -> AccessFacts<'_> {
        AccessFacts::new(self.share.as_ref(), self.capabilities)
    }
}

/// Single entry point for authorization checks on writes and single-node reads.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    /// Company capability resolution.
    capabilities: CapabilityResolver,
    /// The mutation predicate.
    policy: MutationPolicy,
}

impl AccessGuard {
    /// Creates a guard over a capability resolver.
    pub fn new(capabilities: CapabilityResolver) -> Self {
        Self {
            capabilities,
            policy: MutationPolicy::new(),
        }
    }

    /// The capability resolver.
    pub fn capabilities(&self) -> &CapabilityResolver {
        &self.capabilities
    }

    /// The mutation policy.
    pub fn policy(&self) -> &MutationPolicy {
        &self.policy
    }

    /// Collect the share edge and company capabilities of `actor` on `node`.
    ///
    /// Owners need neither, so both lookups are skipped for them.
    pub async fn gather(
        &self,
        uow: &mut dyn UnitOfWork,
        actor: &Actor,
        node: &Node,
    ) -> AppResult<NodeAccess> {
        if node.is_owned_by(actor) {
            return Ok(NodeAccess::default());
        }
        let share = uow
            .shares_for_grantee(actor, &[node.id])
            .await?
            .into_iter()
            .next();
        let capabilities = self
            .capabilities
            .capabilities_for(actor, node.company_id)
            .await?;
        Ok(NodeAccess {
            share,
            capabilities,
        })
    }

    /// Fail with `Forbidden` unless `actor` may perform `operation` on `node`.
    pub async fn require(
        &self,
        uow: &mut dyn UnitOfWork,
        actor: &Actor,
        node: &Node,
        operation: Operation,
    ) -> AppResult<NodeAccess> {
        let access = self.gather(uow, actor, node).await?;
        if let Err(e) = self.policy.require(actor, node, operation, &access.facts()) {
            debug!(node_id = %node.id, actor = %actor, operation = %operation, "Mutation denied");
            return Err(e);
        }
        Ok(access)
    }

    /// Whether `actor` can see `node`.
    pub async fn can_view(
        &self,
        uow: &mut dyn UnitOfWork,
        actor: &Actor,
        node: &Node,
    ) -> AppResult<bool> {
        let access = self.gather(uow, actor, node).await?;
        Ok(self.policy.can_view(actor, node, &access.facts()))
    }

    /// Fail with `Forbidden` unless `actor` may create top-level nodes in `company_id`.
    pub async fn require_company_files(&self, actor: &Actor, company_id: ActorId) -> AppResult<()> {
        let caps = self.capabilities.capabilities(actor, company_id).await?;
        if caps.is_some_and(|c| c.manage_files) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "{actor} may not manage files of company {company_id}"
            )))
        }
    }
}
