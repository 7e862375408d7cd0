//! Request context carrying the resolved actor and its workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::{Actor, ActorId};

/// Context for the current request.
///
/// Built by the HTTP layer from the gateway headers and passed into every
/// service method so that each operation knows *who* is acting and in
/// *which* workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting actor.
    pub actor: Actor,
    /// Company workspace the actor is acting in, if any.
    pub company_context: Option<ActorId>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// A context for `actor` in its personal workspace.
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            company_context: None,
            request_time: Utc::now(),
        }
    }

    /// Act inside a company workspace.
    pub fn in_company(mut self, company_id: ActorId) -> Self {
        self.company_context = Some(company_id);
        self
    }

    /// Whether the actor is acting in a company workspace.
    pub fn has_company(&self) -> bool {
        self.company_context.is_some()
    }
}
