//! Caching decorator for capability lookups.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use docvault_core::config::AccessConfig;
use docvault_core::result::AppResult;
use docvault_core::traits::{CapabilityLookup, Membership};
use docvault_core::types::{Actor, ActorId};

/// Caches lookups, including negative answers, for `capability_cache_ttl_seconds`.
#[derive(Debug, Clone)]
pub struct CachedCapabilityLookup {
    inner: Arc<dyn CapabilityLookup>,
    cache: Cache<(Actor, ActorId), Option<Membership>>,
}

impl CachedCapabilityLookup {
    /// Wrap `inner` with a cache sized by `config`.
    pub fn new(inner: Arc<dyn CapabilityLookup>, config: &AccessConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capability_cache_capacity)
            .time_to_live(Duration::from_secs(config.capability_cache_ttl_seconds))
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl CapabilityLookup for CachedCapabilityLookup {
    async fn lookup(&self, actor: &Actor, company_id: ActorId) -> AppResult<Option<Membership>> {
        let inner = Arc::clone(&self.inner);
        let owned = *actor;
        self.cache
            .try_get_with((owned, company_id), async move {
                debug!(actor = %owned, company_id = %company_id, "Capability cache miss");
                inner.lookup(&owned, company_id).await
            })
            .await
            .map_err(|e| (*e).clone())
    }
}
