//! Actor directory repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::ActorDirectory;
use docvault_core::types::{Actor, ActorId, ActorKind};

/// Resolves actors from the `actors` mirror table.
#[derive(Debug, Clone)]
pub struct ActorRepository {
    pool: PgPool,
}

impl ActorRepository {
    /// Create a new actor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorDirectory for ActorRepository {
    async fn resolve(&self, reference: &str) -> AppResult<Option<Actor>> {
        let row: Option<(ActorId, ActorKind)> =
            sqlx::query_as("SELECT id, kind FROM actors WHERE LOWER(email) = LOWER($1)")
                .bind(reference.trim())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to resolve actor", e)
                })?;
        Ok(row.map(|(id, kind)| Actor::new(id, kind)))
    }

    async fn display_names(&self, actors: &[Actor]) -> AppResult<HashMap<Actor, String>> {
        if actors.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<ActorId> = actors.iter().map(|a| a.id).collect();
        let rows: Vec<(ActorId, ActorKind, String)> =
            sqlx::query_as("SELECT id, kind, display_name FROM actors WHERE id = ANY($1)")
                .bind(&ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load display names", e)
                })?;
        Ok(rows
            .into_iter()
            .map(|(id, kind, name)| (Actor::new(id, kind), name))
            .filter(|(actor, _)| actors.contains(actor))
            .collect())
    }
}
