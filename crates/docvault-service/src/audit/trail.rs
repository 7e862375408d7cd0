//! Per-node audit history reads.

use std::sync::Arc;

use docvault_core::error::AppError;
use docvault_core::events::AuditEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::AuditSink;
use docvault_core::types::{ListQuery, NodeId};
use docvault_database::{NodeStore, UnitOfWork};

use crate::access::AccessGuard;
use crate::context::RequestContext;

/// Reads back what the recorder wrote.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    store: Arc<dyn NodeStore>,
    guard: AccessGuard,
    sink: Arc<dyn AuditSink>,
}

impl AuditTrail {
    /// Creates a trail over `sink`.
    pub fn new(store: Arc<dyn NodeStore>, guard: AccessGuard, sink: Arc<dyn AuditSink>) -> Self {
        Self { store, guard, sink }
    }

    /// Events of one node, most recent first.
    ///
    /// Trashed nodes keep their history. Purged nodes and nodes the actor
    /// cannot see are `NotFound`.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        query: &ListQuery,
    ) -> AppResult<Vec<AuditEvent>> {
        let mut uow = self.store.begin().await?;
        let visible = match uow.find_node(node_id).await? {
            Some(node) => self.guard.can_view(uow.as_mut(), &ctx.actor, &node).await?,
            None => false,
        };
        uow.rollback().await?;
        if !visible {
            return Err(AppError::not_found(format!("Node {node_id} not found")));
        }

        self.sink
            .history(node_id, query.effective_offset(), query.effective_limit())
            .await
    }
}

#[cfg(test)]
mod tests {
    use docvault_core::error::ErrorKind;
    use docvault_core::events::NodeAction;

    use crate::fixtures::{Harness, ctx, owner, stranger};
    use crate::share::{GranteeRef, ShareRequest};

    use super::*;

    fn actions(events: &[AuditEvent]) -> Vec<NodeAction> {
        events.iter().map(|e| e.action).collect()
    }

    #[tokio::test]
    async fn test_history_follows_the_node_lifecycle() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let archive = h.folder(owner(), None, "Archive").await;
        h.services
            .tree
            .move_node(&ctx(owner()), docs.id, Some(archive.id))
            .await
            .unwrap();
        h.services.trash.soft_delete(&ctx(owner()), docs.id).await.unwrap();

        let events = h
            .services
            .history
            .history(&ctx(owner()), docs.id, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(
            actions(&events),
            vec![NodeAction::Deleted, NodeAction::Moved, NodeAction::Created]
        );
        assert!(events.iter().all(|e| e.node_id == docs.id && e.actor == owner()));

        let page = ListQuery {
            offset: 1,
            limit: 1,
            ..ListQuery::default()
        };
        let events = h.services.history.history(&ctx(owner()), docs.id, &page).await.unwrap();
        assert_eq!(actions(&events), vec![NodeAction::Moved]);
    }

    #[tokio::test]
    async fn test_history_needs_visibility() {
        let h = Harness::new().await;
        let contract = h.file(owner(), None, "contract.pdf").await;

        let err = h
            .services
            .history
            .history(&ctx(stranger()), contract.id, &ListQuery::default())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        h.services
            .shares
            .share(
                &ctx(owner()),
                contract.id,
                ShareRequest {
                    grantee: GranteeRef::Actor {
                        id: stranger().id,
                        kind: stranger().kind,
                    },
                    edit_allowed: false,
                },
            )
            .await
            .unwrap();
        let events = h
            .services
            .history
            .history(&ctx(stranger()), contract.id, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(actions(&events), vec![NodeAction::Shared, NodeAction::Created]);

        h.services.trash.soft_delete(&ctx(owner()), contract.id).await.unwrap();
        h.services.trash.purge(&ctx(owner()), contract.id).await.unwrap();
        let err = h
            .services
            .history
            .history(&ctx(owner()), contract.id, &ListQuery::default())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
