//! Capability resolution for one actor in one company.

use std::sync::Arc;

use docvault_core::result::AppResult;
use docvault_core::traits::{Capabilities, CapabilityLookup};
use docvault_core::types::{Actor, ActorId, ActorKind};

/// Answers "which capabilities does this actor hold in this company".
#[derive(Debug, Clone)]
pub struct CapabilityResolver {
    lookup: Arc<dyn CapabilityLookup>,
}

impl CapabilityResolver {
    /// Create a resolver over `lookup`.
    pub fn new(lookup: Arc<dyn CapabilityLookup>) -> Self {
        Self { lookup }
    }

    /// Whether `actor` is the company account itself.
    pub fn is_company_admin(actor: &Actor, company_id: ActorId) -> bool {
        actor.kind == ActorKind::Company && actor.id == company_id
    }

    /// Capabilities of `actor` in `company_id`, or `None` without an active membership.
    ///
    /// The company account holds every capability in its own company.
    pub async fn capabilities(
        &self,
        actor: &Actor,
        company_id: ActorId,
    ) -> AppResult<Option<Capabilities>> {
        if Self::is_company_admin(actor, company_id) {
            return Ok(Some(Capabilities::all()));
        }
        Ok(self
            .lookup
            .lookup(actor, company_id)
            .await?
            .map(|m| m.capabilities))
    }

    /// Like [`capabilities`](Self::capabilities) for an optional company.
    pub async fn capabilities_for(
        &self,
        actor: &Actor,
        company_id: Option<ActorId>,
    ) -> AppResult<Option<Capabilities>> {
        match company_id {
            Some(company_id) => self.capabilities(actor, company_id).await,
            None => Ok(None),
        }
    }
}
