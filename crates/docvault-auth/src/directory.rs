//! In-process actor directory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use docvault_core::result::AppResult;
use docvault_core::traits::ActorDirectory;
use docvault_core::types::Actor;

#[derive(Debug, Default)]
struct Entries {
    by_email: HashMap<String, Actor>,
    names: HashMap<Actor, String>,
}

/// Email and display-name table held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticActorDirectory {
    entries: Arc<RwLock<Entries>>,
}

impl StaticActorDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `actor` under `email` with a display name.
    pub async fn register(&self, actor: Actor, email: &str, display_name: &str) {
        let mut entries = self.entries.write().await;
        entries.by_email.insert(email.trim().to_lowercase(), actor);
        entries.names.insert(actor, display_name.to_string());
    }
}

#[async_trait]
impl ActorDirectory for StaticActorDirectory {
    async fn resolve(&self, reference: &str) -> AppResult<Option<Actor>> {
        let entries = self.entries.read().await;
        Ok(entries
            .by_email
            .get(&reference.trim().to_lowercase())
            .copied())
    }

    async fn display_names(&self, actors: &[Actor]) -> AppResult<HashMap<Actor, String>> {
        let entries = self.entries.read().await;
        Ok(actors
            .iter()
            .filter_map(|a| entries.names.get(a).map(|n| (*a, n.clone())))
            .collect())
    }
}
