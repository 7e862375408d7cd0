//! Actor resolution.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::Actor;

/// Resolves external actor references (such as an email) to `(id, kind)` pairs.
#[async_trait]
pub trait ActorDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a reference, or `None` when nobody matches.
    async fn resolve(&self, reference: &str) -> AppResult<Option<Actor>>;

    /// Display names for a batch of actors. Unknown actors are omitted.
    async fn display_names(&self, actors: &[Actor]) -> AppResult<HashMap<Actor, String>>;
}
