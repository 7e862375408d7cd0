//! Company membership repository implementation.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::{Capabilities, CapabilityLookup, Membership};
use docvault_core::types::{Actor, ActorId};

#[derive(Debug, FromRow)]
struct MembershipRow {
    company_id: ActorId,
    manage_files: bool,
    view_only: bool,
    view_shared: bool,
    manage_collaborators: bool,
    view_metrics: bool,
}

/// Reads active memberships from the `company_memberships` mirror table.
#[derive(Debug, Clone)]
pub struct CapabilityRepository {
    pool: PgPool,
}

impl CapabilityRepository {
    /// Create a new capability repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CapabilityLookup for CapabilityRepository {
    async fn lookup(&self, actor: &Actor, company_id: ActorId) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            "SELECT company_id, manage_files, view_only, view_shared, manage_collaborators, view_metrics \
             FROM company_memberships \
             WHERE actor_id = $1 AND actor_kind = $2 AND company_id = $3 AND active",
        )
        .bind(actor.id)
        .bind(actor.kind)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up membership", e))?;

        Ok(row.map(|r| Membership {
            actor: *actor,
            company_id: r.company_id,
            capabilities: Capabilities {
                manage_files: r.manage_files,
                view_only: r.view_only,
                view_shared: r.view_shared,
                manage_collaborators: r.manage_collaborators,
                view_metrics: r.view_metrics,
            },
        }))
    }
}
