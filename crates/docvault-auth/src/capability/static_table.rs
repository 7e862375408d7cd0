//! In-process membership table.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use docvault_core::result::AppResult;
use docvault_core::traits::{Capabilities, CapabilityLookup, Membership};
use docvault_core::types::{Actor, ActorId};

/// Memberships held in memory. Used with the memory store and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilityLookup {
    memberships: Arc<RwLock<HashMap<(Actor, ActorId), Capabilities>>>,
}

impl StaticCapabilityLookup {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a membership.
    pub async fn grant(&self, actor: Actor, company_id: ActorId, capabilities: Capabilities) {
        self.memberships
            .write()
            .await
            .insert((actor, company_id), capabilities);
    }

    /// Remove a membership.
    pub async fn revoke(&self, actor: &Actor, company_id: ActorId) {
        self.memberships.write().await.remove(&(*actor, company_id));
    }
}

#[async_trait]
impl CapabilityLookup for StaticCapabilityLookup {
    async fn lookup(&self, actor: &Actor, company_id: ActorId) -> AppResult<Option<Membership>> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .get(&(*actor, company_id))
            .map(|capabilities| Membership {
                actor: *actor,
                company_id,
                capabilities: *capabilities,
            }))
    }
}
