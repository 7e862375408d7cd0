//! Create, move and update with share inheritance and cycle-safe moves.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use docvault_auth::Operation;
use docvault_core::error::AppError;
use docvault_core::events::NodeAction;
use docvault_core::result::AppResult;
use docvault_core::types::{Actor, ActorKind, NodeId, NodeKind};
use docvault_database::NodeStore;
use docvault_entity::node::{ContentUpdate, NewNode, Node, NodePatch, PatchOutcome, validate_name};

use super::checks;
use crate::access::AccessGuard;
use crate::audit::{AuditRecorder, DeadlineRelay};
use crate::context::RequestContext;

/// Request to create a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    /// Parent folder (None for a top-level node).
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// File or folder.
    pub kind: NodeKind,
    /// Display name.
    pub name: String,
    /// Status label (defaults to `"valid"`).
    #[serde(default)]
    pub status: Option<String>,
    /// Comments.
    #[serde(default)]
    pub comments: Option<String>,
    /// Expiry date (files only).
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    /// Content already in the object store (files only).
    #[serde(skip)]
    pub content: Option<ContentUpdate>,
}

impl CreateNodeRequest {
    /// A folder request.
    pub fn folder(parent_id: Option<NodeId>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Folder, parent_id, name)
    }

    /// A file request.
    pub fn file(parent_id: Option<NodeId>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::File, parent_id, name)
    }

    fn new(kind: NodeKind, parent_id: Option<NodeId>, name: impl Into<String>) -> Self {
        Self {
            parent_id,
            kind,
            name: name.into(),
            status: None,
            comments: None,
            expires_on: None,
            content: None,
        }
    }

    fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        if let Some(status) = &self.status {
            if status.trim().is_empty() {
                return Err(AppError::validation("Status cannot be empty"));
            }
        }
        if self.kind.is_folder() {
            if self.expires_on.is_some() {
                return Err(AppError::validation("Only files carry an expiry date"));
            }
            if self.content.is_some() {
                return Err(AppError::validation("Only files carry content"));
            }
        }
        if self.content.as_ref().is_some_and(|c| c.size_bytes < 0) {
            return Err(AppError::validation("Content size cannot be negative"));
        }
        Ok(())
    }
}

/// Tree operations over the node store.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Node store.
    store: Arc<dyn NodeStore>,
    /// Authorization.
    guard: AccessGuard,
    /// Audit events.
    audit: AuditRecorder,
    /// Expiry notifications.
    deadlines: DeadlineRelay,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(
        store: Arc<dyn NodeStore>,
        guard: AccessGuard,
        audit: AuditRecorder,
        deadlines: DeadlineRelay,
    ) -> Self {
        Self {
            store,
            guard,
            audit,
            deadlines,
        }
    }

    /// Creates a node under an active folder or at the top level.
    ///
    /// A child joins its parent's company workspace and receives a copy of
    /// every share edge the parent carries at this moment. A top-level node
    /// created under a company context belongs to that company.
    pub async fn create(&self, ctx: &RequestContext, req: CreateNodeRequest) -> AppResult<Node> {
        req.validate()?;

        let mut uow = self.store.begin().await?;
        let mut new = NewNode::new(req.kind, req.name.trim(), ctx.actor);

        match req.parent_id {
            Some(parent_id) => {
                let parent = checks::lock_folder(uow.as_mut(), parent_id).await?;
                self.guard
                    .require(uow.as_mut(), &ctx.actor, &parent, Operation::CreateChild)
                    .await?;
                new = new.under(parent_id);
                if let (Some(id), Some(kind)) = (parent.company_id, parent.company_kind) {
                    new = new.in_company(Actor::new(id, kind));
                }
            }
            None => {
                if let Some(company_id) = ctx.company_context {
                    self.guard
                        .require_company_files(&ctx.actor, company_id)
                        .await?;
                    new = new.in_company(Actor::new(company_id, ActorKind::Company));
                }
            }
        }

        if let Some(status) = req.status {
            new.status = status.trim().to_string();
        }
        new.comments = req.comments;
        new.expires_on = req.expires_on;
        if let Some(content) = req.content {
            new = new.with_content(content.content_ref, content.size_bytes, content.extension);
        }

        let node = uow.insert_node(new).await?;
        let inherited = match node.parent_id {
            Some(parent_id) => uow.inherit_shares(node.id, parent_id).await?,
            None => 0,
        };
        uow.commit().await?;

        info!(
            node_id = %node.id,
            kind = %node.kind,
            parent_id = ?node.parent_id,
            actor = %ctx.actor,
            inherited_shares = inherited,
            "Node created"
        );

        self.audit
            .record(
                ctx,
                node.id,
                NodeAction::Created,
                json!({
                    "kind": node.kind,
                    "name": node.name,
                    "parent_id": node.parent_id,
                    "inherited_shares": inherited,
                }),
            )
            .await;
        if node.expires_on.is_some() {
            self.deadlines.expiry_changed(node.id, node.expires_on).await;
        }

        Ok(node)
    }

    /// Moves a node under another folder, or to the top level with `None`.
    ///
    /// Only `parent_id` is rewritten; descendants follow implicitly.
    pub async fn move_node(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        new_parent_id: Option<NodeId>,
    ) -> AppResult<Node> {
        let mut uow = self.store.begin().await?;
        let node = checks::lock_active(uow.as_mut(), node_id).await?;
        self.guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Move)
            .await?;

        if let Some(target_id) = new_parent_id {
            let target = checks::check_move_target(uow.as_mut(), &node, target_id).await?;
            self.guard
                .require(uow.as_mut(), &ctx.actor, &target, Operation::CreateChild)
                .await?;
        }

        if node.parent_id == new_parent_id {
            uow.rollback().await?;
            debug!(node_id = %node_id, "Move to current parent ignored");
            return Ok(node);
        }

        let moved = uow.set_parent(node_id, new_parent_id).await?;
        uow.commit().await?;

        info!(
            node_id = %node_id,
            from = ?node.parent_id,
            to = ?new_parent_id,
            actor = %ctx.actor,
            "Node moved"
        );
        self.audit
            .record(
                ctx,
                node_id,
                NodeAction::Moved,
                json!({ "from": node.parent_id, "to": new_parent_id }),
            )
            .await;

        Ok(moved)
    }

    /// Applies a partial update.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        patch: NodePatch,
    ) -> AppResult<Node> {
        let (node, _) = self.apply_patch(ctx, node_id, patch).await?;
        Ok(node)
    }

    /// Applies a partial update and reports what changed.
    ///
    /// Changing the owner additionally requires ownership or company admin.
    pub async fn apply_patch(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        patch: NodePatch,
    ) -> AppResult<(Node, PatchOutcome)> {
        let mut uow = self.store.begin().await?;
        let mut node = checks::lock_active(uow.as_mut(), node_id).await?;
        patch.validate(&node)?;

        let access = self
            .guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Update)
            .await?;
        if patch.transfers_ownership() {
            self.guard.policy().require(
                &ctx.actor,
                &node,
                Operation::TransferOwnership,
                &access.facts(),
            )?;
        }

        let outcome = patch.apply(&mut node, Utc::now());
        if outcome.is_noop() {
            uow.rollback().await?;
            return Ok((node, outcome));
        }

        let node = uow.update_node(&node).await?;
        uow.commit().await?;

        let fields: Vec<&str> = outcome.changes.iter().map(|c| c.field).collect();
        info!(node_id = %node_id, actor = %ctx.actor, fields = ?fields, "Node updated");

        if let Some(action) = outcome.action() {
            self.audit
                .record(ctx, node_id, action, outcome.details())
                .await;
        }
        if outcome.changed("expires_on") {
            self.deadlines.expiry_changed(node_id, node.expires_on).await;
        }

        Ok((node, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Harness, ctx, grantee, owner, stranger};
    use crate::share::{GranteeRef, ShareRequest};
    use docvault_core::error::ErrorKind;
    use rand::RngExt;

    fn share_with(actor: Actor, edit_allowed: bool) -> ShareRequest {
        ShareRequest {
            grantee: GranteeRef::Actor {
                id: actor.id,
                kind: actor.kind,
            },
            edit_allowed,
        }
    }

    #[tokio::test]
    async fn test_create_requires_active_folder_parent() {
        let h = Harness::new().await;
        let file = h.file(owner(), None, "a.pdf").await;
        let err = h
            .services
            .tree
            .create(&ctx(owner()), CreateNodeRequest::file(Some(file.id), "b.pdf"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotAFolder));

        let err = h
            .services
            .tree
            .create(&ctx(owner()), CreateNodeRequest::file(Some(NodeId(404)), "b.pdf"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        let docs = h.folder(owner(), None, "Docs").await;
        h.services.trash.soft_delete(&ctx(owner()), docs.id).await.unwrap();
        let err = h
            .services
            .tree
            .create(&ctx(owner()), CreateNodeRequest::file(Some(docs.id), "b.pdf"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_attributes() {
        let h = Harness::new().await;
        let mut req = CreateNodeRequest::folder(None, "Docs");
        req.expires_on = NaiveDate::from_ymd_opt(2030, 1, 1);
        let err = h.services.tree.create(&ctx(owner()), req).await.unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        let err = h
            .services
            .tree
            .create(&ctx(owner()), CreateNodeRequest::folder(None, "  "))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_create_in_foreign_folder_is_forbidden() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let err = h
            .services
            .tree
            .create(&ctx(stranger()), CreateNodeRequest::file(Some(docs.id), "x.pdf"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));
    }

    #[tokio::test]
    async fn test_children_inherit_parent_shares_at_creation() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        h.file(owner(), Some(docs.id), "early.pdf").await;
        h.services
            .shares
            .share(&ctx(owner()), docs.id, share_with(grantee(), true))
            .await
            .unwrap();

        // The editor creates a child; it inherits the edge naming the editor too.
        let late = h.file(grantee(), Some(docs.id), "late.pdf").await;
        assert_eq!(late.owner(), grantee());

        let mut names = h.names(grantee(), Some(docs.id)).await;
        names.sort();
        assert_eq!(names, vec!["early.pdf", "late.pdf"]);
    }

    #[tokio::test]
    async fn test_snapshot_semantics_of_inheritance() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let child = h.file(owner(), Some(docs.id), "child.pdf").await;
        let sub = h.folder(owner(), Some(docs.id), "Sub").await;

        h.services
            .shares
            .share(&ctx(owner()), sub.id, share_with(grantee(), false))
            .await
            .unwrap();
        let nested = h.file(owner(), Some(sub.id), "nested.pdf").await;
        assert!(
            h.services
                .access
                .get_node(&ctx(grantee()), nested.id)
                .await
                .is_ok()
        );
        assert!(
            h.services
                .access
                .get_node(&ctx(grantee()), child.id)
                .await
                .unwrap_err()
                .is(ErrorKind::NotFound)
        );

        h.services
            .shares
            .share(&ctx(owner()), docs.id, share_with(grantee(), false))
            .await
            .unwrap();
        assert!(
            h.services
                .access
                .get_node(&ctx(grantee()), child.id)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_archive_move_and_cyclic_rejection() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let contract = h.file(owner(), Some(docs.id), "contract.pdf").await;
        let archive = h.folder(owner(), Some(docs.id), "Archive").await;

        let moved = h
            .services
            .tree
            .move_node(&ctx(owner()), contract.id, Some(archive.id))
            .await
            .unwrap();
        assert_eq!(moved.parent_id, Some(archive.id));

        assert_eq!(h.names(owner(), Some(docs.id)).await, vec!["Archive"]);
        assert_eq!(h.names(owner(), Some(archive.id)).await, vec!["contract.pdf"]);

        let err = h
            .services
            .tree
            .move_node(&ctx(owner()), docs.id, Some(archive.id))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::CyclicMove));

        let err = h
            .services
            .tree
            .move_node(&ctx(owner()), docs.id, Some(docs.id))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidTarget));

        let err = h
            .services
            .tree
            .move_node(&ctx(owner()), archive.id, Some(contract.id))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotAFolder));

        assert!(h.actions().contains(&NodeAction::Moved));
    }

    #[tokio::test]
    async fn test_move_to_root_and_by_stranger() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let contract = h.file(owner(), Some(docs.id), "contract.pdf").await;

        let err = h
            .services
            .tree
            .move_node(&ctx(stranger()), contract.id, None)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));

        let moved = h
            .services
            .tree
            .move_node(&ctx(owner()), contract.id, None)
            .await
            .unwrap();
        assert!(moved.is_root());
        assert_eq!(h.names(owner(), None).await, vec!["Docs", "contract.pdf"]);
    }

    #[tokio::test]
    async fn test_update_records_rename_and_guards_ownership() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let contract = h.file(owner(), Some(docs.id), "contract.pdf").await;
        h.services
            .shares
            .share(&ctx(owner()), docs.id, share_with(grantee(), true))
            .await
            .unwrap();

        let renamed = h
            .services
            .tree
            .update(&ctx(grantee()), contract.id, NodePatch::rename("signed.pdf"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "signed.pdf");
        assert!(h.actions().contains(&NodeAction::Renamed));

        let transfer = NodePatch {
            owner: Some(grantee()),
            ..Default::default()
        };
        let err = h
            .services
            .tree
            .update(&ctx(grantee()), contract.id, transfer.clone())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));

        let transferred = h
            .services
            .tree
            .update(&ctx(owner()), contract.id, transfer)
            .await
            .unwrap();
        assert_eq!(transferred.owner(), grantee());
    }

    #[tokio::test]
    async fn test_noop_update_is_not_audited() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let before = h.actions().len();
        h.services
            .tree
            .update(&ctx(owner()), docs.id, NodePatch::rename("Docs"))
            .await
            .unwrap();
        assert_eq!(h.actions().len(), before);
    }

    /// Walks every parent chain and fails if any node is reached twice.
    fn assert_acyclic(nodes: &[Node]) {
        let parents: std::collections::HashMap<NodeId, Option<NodeId>> =
            nodes.iter().map(|n| (n.id, n.parent_id)).collect();
        for node in nodes {
            let mut seen = std::collections::HashSet::new();
            let mut current = Some(node.id);
            while let Some(id) = current {
                assert!(seen.insert(id), "cycle through node {id}");
                current = parents.get(&id).copied().flatten();
            }
        }
    }

    #[tokio::test]
    async fn test_random_moves_never_create_cycles() {
        let h = Harness::new().await;
        let mut rng = rand::rng();
        let mut folders = vec![h.folder(owner(), None, "root").await.id];
        for i in 0..24 {
            let parent = folders[rng.random_range(0..folders.len())];
            folders.push(h.folder(owner(), Some(parent), &format!("f{i}")).await.id);
        }

        for _ in 0..200 {
            let node = folders[rng.random_range(0..folders.len())];
            let target = folders[rng.random_range(0..folders.len())];
            let result = h
                .services
                .tree
                .move_node(&ctx(owner()), node, Some(target))
                .await;
            if let Err(e) = result {
                assert!(
                    e.is(ErrorKind::CyclicMove) || e.is(ErrorKind::InvalidTarget),
                    "unexpected error {e}"
                );
                if e.is(ErrorKind::CyclicMove) {
                    // The target really is below the node.
                    let nodes = h.all_nodes().await;
                    let parents: std::collections::HashMap<NodeId, Option<NodeId>> =
                        nodes.iter().map(|n| (n.id, n.parent_id)).collect();
                    let mut current = Some(target);
                    let mut below = false;
                    while let Some(id) = current {
                        if id == node {
                            below = true;
                            break;
                        }
                        current = parents.get(&id).copied().flatten();
                    }
                    assert!(below);
                }
            }
        }
        assert_acyclic(&h.all_nodes().await);
    }

    #[tokio::test]
    async fn test_crossing_moves_in_parallel_leave_one_cyclic() {
        let h = Harness::new().await;
        let a = h.folder(owner(), None, "A").await;
        let a1 = h.folder(owner(), Some(a.id), "A1").await;
        let b = h.folder(owner(), None, "B").await;
        let b1 = h.folder(owner(), Some(b.id), "B1").await;

        let owner_ctx = ctx(owner());
        let (first, second) = tokio::join!(
            h.services.tree.move_node(&owner_ctx, a.id, Some(b1.id)),
            h.services.tree.move_node(&owner_ctx, b.id, Some(a1.id)),
        );

        let failures: Vec<_> = [first, second].into_iter().filter_map(Result::err).collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].is(ErrorKind::CyclicMove));
        assert_acyclic(&h.all_nodes().await);
    }
}
