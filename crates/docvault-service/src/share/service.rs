//! Granting and revoking share edges.
//!
//! Sharing a folder writes the same edge onto every node currently in its
//! subtree. Nodes created later copy their parent's edges at creation time,
//! so a folder shared before a child existed reaches that child only through
//! inheritance, and a child that predates a share receives it only when the
//! folder is shared (again).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use docvault_auth::Operation;
use docvault_core::error::AppError;
use docvault_core::events::NodeAction;
use docvault_core::result::AppResult;
use docvault_core::traits::ActorDirectory;
use docvault_core::types::{Actor, ActorId, ActorKind, ListQuery, NodeId};
use docvault_database::{NodeStore, UnitOfWork};
use docvault_entity::node::Node;
use docvault_entity::share::{Share, ShareGrant};

use crate::access::{AccessGuard, AccessResolver, NodeView};
use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::tree::checks;

/// How a share request names the grantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GranteeRef {
    /// An already resolved actor.
    Actor {
        /// Actor id.
        id: ActorId,
        /// Actor kind.
        kind: ActorKind,
    },
    /// An email address resolved through the actor directory.
    Email {
        /// Email address.
        email: String,
    },
}

/// Request to share a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    /// Who receives access.
    pub grantee: GranteeRef,
    /// Whether the grantee may edit.
    #[serde(default)]
    pub edit_allowed: bool,
}

/// A share edge with the grantee's display name.
#[derive(Debug, Clone, Serialize)]
pub struct ShareView {
    /// The edge.
    #[serde(flatten)]
    pub share: Share,
    /// Display name from the directory.
    pub grantee_name: Option<String>,
}

/// Manages share edges.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// Node store.
    store: Arc<dyn NodeStore>,
    /// Authorization.
    guard: AccessGuard,
    /// Email and display-name resolution.
    directory: Arc<dyn ActorDirectory>,
    /// Audit events.
    audit: AuditRecorder,
    /// Shared-with-me listing.
    resolver: AccessResolver,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        store: Arc<dyn NodeStore>,
        guard: AccessGuard,
        directory: Arc<dyn ActorDirectory>,
        audit: AuditRecorder,
        resolver: AccessResolver,
    ) -> Self {
        Self {
            store,
            guard,
            directory,
            audit,
            resolver,
        }
    }

    /// Grants `req.grantee` access to a node and, for a folder, to its whole subtree.
    ///
    /// Repeating a grant updates `edit_allowed` in place.
    pub async fn share(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        req: ShareRequest,
    ) -> AppResult<Share> {
        let grantee = self.resolve_grantee(&req.grantee).await?;
        if grantee == ctx.actor {
            return Err(AppError::validation("A node cannot be shared with yourself"));
        }

        let mut uow = self.store.begin().await?;
        let node = checks::lock_active(uow.as_mut(), node_id).await?;
        self.guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Share)
            .await?;

        let targets = cascade_targets(uow.as_mut(), &node).await?;
        let grant = ShareGrant::new(ctx.actor, grantee, req.edit_allowed);
        let written = uow.upsert_shares(&targets, &grant).await?;
        let share = uow
            .shares_for_grantee(&grantee, &[node_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal(format!("Share on node {node_id} was not written")))?;
        uow.commit().await?;

        info!(
            node_id = %node_id,
            grantee = %grantee,
            edit_allowed = req.edit_allowed,
            nodes = targets.len(),
            written,
            "Node shared"
        );
        self.audit
            .record(
                ctx,
                node_id,
                NodeAction::Shared,
                json!({
                    "grantee": grantee,
                    "edit_allowed": req.edit_allowed,
                    "nodes": targets.len(),
                }),
            )
            .await;

        Ok(share)
    }

    /// Removes `grantee`'s edge from a node and, for a folder, from its subtree.
    pub async fn unshare(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        grantee: Actor,
    ) -> AppResult<u64> {
        let mut uow = self.store.begin().await?;
        let node = checks::lock_active(uow.as_mut(), node_id).await?;
        self.guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Share)
            .await?;

        if uow
            .shares_for_grantee(&grantee, &[node_id])
            .await?
            .is_empty()
        {
            return Err(AppError::not_found(format!(
                "Node {node_id} is not shared with {grantee}"
            )));
        }

        let targets = cascade_targets(uow.as_mut(), &node).await?;
        let removed = uow.delete_shares(&targets, &grantee).await?;
        uow.commit().await?;

        info!(node_id = %node_id, grantee = %grantee, removed, "Node unshared");
        self.audit
            .record(
                ctx,
                node_id,
                NodeAction::Unshared,
                json!({ "grantee": grantee, "removed": removed }),
            )
            .await;

        Ok(removed)
    }

    /// Edges on a node. Requires the right to share it.
    pub async fn list_node_shares(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
    ) -> AppResult<Vec<ShareView>> {
        let mut uow = self.store.begin().await?;
        let node = checks::find_active(uow.as_mut(), node_id).await?;
        self.guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Share)
            .await?;
        let shares = uow.shares_for_node(node_id).await?;
        uow.rollback().await?;

        let grantees: Vec<Actor> = shares.iter().map(Share::grantee).collect();
        let names = match self.directory.display_names(&grantees).await {
            Ok(names) => names,
            Err(e) => {
                warn!(node_id = %node_id, error = %e, "Grantee names unavailable");
                Default::default()
            }
        };

        Ok(shares
            .into_iter()
            .map(|share| {
                let grantee_name = names.get(&share.grantee()).cloned();
                ShareView {
                    share,
                    grantee_name,
                }
            })
            .collect())
    }

    /// Nodes shared with the actor.
    pub async fn shared_with_me(
        &self,
        ctx: &RequestContext,
        root_only: bool,
        query: &ListQuery,
    ) -> AppResult<Vec<NodeView>> {
        self.resolver.shared_with_me(ctx, root_only, query).await
    }

    async fn resolve_grantee(&self, grantee: &GranteeRef) -> AppResult<Actor> {
        match grantee {
            GranteeRef::Actor { id, kind } => Ok(Actor::new(*id, *kind)),
            GranteeRef::Email { email } => self
                .directory
                .resolve(email)
                .await?
                .ok_or_else(|| AppError::not_found(format!("No actor registered as '{email}'"))),
        }
    }
}

/// The node itself, plus every node currently below it when it is a folder.
async fn cascade_targets(uow: &mut dyn UnitOfWork, node: &Node) -> AppResult<Vec<NodeId>> {
    if node.is_folder() {
        Ok(uow.lock_subtree(node.id).await?.preorder())
    } else {
        Ok(vec![node.id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Harness, ctx, grantee, owner, stranger};
    use docvault_core::error::ErrorKind;

    fn to(actor: Actor, edit_allowed: bool) -> ShareRequest {
        ShareRequest {
            grantee: GranteeRef::Actor {
                id: actor.id,
                kind: actor.kind,
            },
            edit_allowed,
        }
    }

    #[tokio::test]
    async fn test_second_share_updates_edit_flag_in_place() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        h.file(owner(), Some(docs.id), "contract.pdf").await;

        let first = h
            .services
            .shares
            .share(&ctx(owner()), docs.id, to(grantee(), false))
            .await
            .unwrap();
        let second = h
            .services
            .shares
            .share(&ctx(owner()), docs.id, to(grantee(), true))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.edit_allowed);

        let shares = h
            .services
            .shares
            .list_node_shares(&ctx(owner()), docs.id)
            .await
            .unwrap();
        assert_eq!(shares.len(), 1);
        assert!(shares[0].share.edit_allowed);
    }

    #[tokio::test]
    async fn test_grantee_by_email() {
        let h = Harness::new().await;
        h.directory.register(grantee(), "ana@example.com", "Ana").await;
        let docs = h.folder(owner(), None, "Docs").await;

        let share = h
            .services
            .shares
            .share(
                &ctx(owner()),
                docs.id,
                ShareRequest {
                    grantee: GranteeRef::Email {
                        email: "ANA@example.com".to_string(),
                    },
                    edit_allowed: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(share.grantee(), grantee());

        let views = h
            .services
            .shares
            .list_node_shares(&ctx(owner()), docs.id)
            .await
            .unwrap();
        assert_eq!(views[0].grantee_name.as_deref(), Some("Ana"));

        let err = h
            .services
            .shares
            .share(
                &ctx(owner()),
                docs.id,
                ShareRequest {
                    grantee: GranteeRef::Email {
                        email: "nobody@example.com".to_string(),
                    },
                    edit_allowed: false,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_self_share_and_foreign_share_are_rejected() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let err = h
            .services
            .shares
            .share(&ctx(owner()), docs.id, to(owner(), false))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        let err = h
            .services
            .shares
            .share(&ctx(stranger()), docs.id, to(grantee(), false))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));

        // A read-only grantee cannot pass the folder on.
        h.services
            .shares
            .share(&ctx(owner()), docs.id, to(grantee(), false))
            .await
            .unwrap();
        let err = h
            .services
            .shares
            .share(&ctx(grantee()), docs.id, to(stranger(), false))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));
    }

    #[tokio::test]
    async fn test_unshare_cascades_over_subtree() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let contract = h.file(owner(), Some(docs.id), "contract.pdf").await;
        h.services
            .shares
            .share(&ctx(owner()), docs.id, to(grantee(), false))
            .await
            .unwrap();

        let removed = h
            .services
            .shares
            .unshare(&ctx(owner()), docs.id, grantee())
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(h.names(grantee(), Some(docs.id)).await.is_empty());
        assert!(
            h.services
                .access
                .get_node(&ctx(grantee()), contract.id)
                .await
                .is_err()
        );

        let err = h
            .services
            .shares
            .unshare(&ctx(owner()), docs.id, grantee())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        assert!(h.actions().contains(&NodeAction::Unshared));
    }

    #[tokio::test]
    async fn test_shared_with_me_root_only() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        h.file(owner(), Some(docs.id), "contract.pdf").await;
        h.services
            .shares
            .share(&ctx(owner()), docs.id, to(grantee(), false))
            .await
            .unwrap();

        let all = h
            .services
            .shares
            .shared_with_me(&ctx(grantee()), false, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let roots = h
            .services
            .shares
            .shared_with_me(&ctx(grantee()), true, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].node.name, "Docs");
        assert_eq!(roots[0].shared_by, Some(owner()));
        assert!(!roots[0].editable);
    }
}
