//! Soft delete, restore, purge, empty and list operations.
//!
//! A trashed folder always has a fully trashed subtree: deleting stamps
//! every active descendant, and restoring a node whose parent is still in
//! the trash is refused unless a new parent is given.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use docvault_auth::Operation;
use docvault_core::error::AppError;
use docvault_core::events::NodeAction;
use docvault_core::result::AppResult;
use docvault_core::traits::ObjectStore;
use docvault_core::types::{Actor, ActorId, ListQuery, NodeId};
use docvault_database::store::{CompanyScope, ParentScope, TrashState};
use docvault_database::{NodeFilter, NodeStore, UnitOfWork};
use docvault_entity::node::{DeletionStamp, Node};

use super::purge::{PurgedSubtree, purge_subtree};
use crate::access::AccessGuard;
use crate::audit::{AuditRecorder, DeadlineRelay};
use crate::content::blobs;
use crate::context::RequestContext;
use crate::tree::checks;

/// Result of a soft delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSummary {
    /// The node that was deleted.
    pub node_id: NodeId,
    /// Nodes stamped, including the node itself.
    pub trashed: u64,
}

/// Result of a purge or a bulk purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeSummary {
    /// Trashed nodes matched and purged with their subtrees.
    pub roots: usize,
    /// Node rows removed in total.
    pub nodes: usize,
}

/// A trashed node in a trash listing.
#[derive(Debug, Clone, Serialize)]
pub struct TrashEntry {
    /// The node row.
    #[serde(flatten)]
    pub node: Node,
    /// Still-trashed direct children (0 for files).
    pub children_count: i64,
}

/// Selection for bulk purges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrashFilter {
    /// Owner of the trashed nodes.
    #[serde(default)]
    pub owner: Option<Actor>,
    /// Company of the trashed nodes.
    #[serde(default)]
    pub company_id: Option<ActorId>,
    /// Who trashed the nodes.
    #[serde(default)]
    pub deleted_by: Option<Actor>,
    /// Only nodes trashed more than this many days ago.
    #[serde(default)]
    pub older_than_days: Option<u32>,
}

impl TrashFilter {
    fn to_node_filter(&self) -> NodeFilter {
        let mut filter = NodeFilter::trashed();
        filter.owner = self.owner;
        if let Some(company_id) = self.company_id {
            filter = filter.company(CompanyScope::Exactly(company_id));
        }
        filter.deleted_by = self.deleted_by;
        filter.deleted_before = self
            .older_than_days
            .map(|days| Utc::now() - Duration::days(i64::from(days)));
        filter
    }
}

/// Manages the trash.
#[derive(Debug, Clone)]
pub struct TrashService {
    /// Node store.
    store: Arc<dyn NodeStore>,
    /// Authorization.
    guard: AccessGuard,
    /// Blob cleanup after purges.
    objects: Arc<dyn ObjectStore>,
    /// Audit events.
    audit: AuditRecorder,
    /// Expiry tracking.
    deadlines: DeadlineRelay,
}

impl TrashService {
    /// Creates a new trash service.
    pub fn new(
        store: Arc<dyn NodeStore>,
        guard: AccessGuard,
        objects: Arc<dyn ObjectStore>,
        audit: AuditRecorder,
        deadlines: DeadlineRelay,
    ) -> Self {
        Self {
            store,
            guard,
            objects,
            audit,
            deadlines,
        }
    }

    /// Moves a node and its active descendants to the trash.
    ///
    /// Descendants already in the trash keep their earlier stamp.
    pub async fn soft_delete(&self, ctx: &RequestContext, node_id: NodeId) -> AppResult<DeleteSummary> {
        let mut uow = self.store.begin().await?;
        let node = checks::lock_active(uow.as_mut(), node_id).await?;
        self.guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Delete)
            .await?;

        let mut ids = vec![node_id];
        if node.is_folder() {
            ids.extend(uow.lock_subtree(node_id).await?.active_descendants());
        }
        let trashed = uow
            .mark_deleted(&ids, DeletionStamp::now(ctx.actor))
            .await?;
        uow.commit().await?;

        info!(node_id = %node_id, actor = %ctx.actor, trashed, "Node moved to trash");
        self.audit
            .record(ctx, node_id, NodeAction::Deleted, json!({ "trashed": trashed }))
            .await;

        Ok(DeleteSummary { node_id, trashed })
    }

    /// Brings a trashed node and its still-trashed descendants back.
    ///
    /// With `new_parent_id` the node is relocated in the same unit of work;
    /// the target is validated as for a move. Without it the original parent
    /// must be active.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        new_parent_id: Option<NodeId>,
    ) -> AppResult<Node> {
        let mut uow = self.store.begin().await?;
        let node = checks::lock_trashed(uow.as_mut(), node_id).await?;
        self.guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Restore)
            .await?;

        let parent_id = match new_parent_id {
            Some(target_id) => {
                let target = checks::check_move_target(uow.as_mut(), &node, target_id).await?;
                self.guard
                    .require(uow.as_mut(), &ctx.actor, &target, Operation::CreateChild)
                    .await?;
                if node.parent_id != Some(target_id) {
                    uow.set_parent(node_id, Some(target_id)).await?;
                }
                Some(target_id)
            }
            None => {
                if let Some(parent_id) = node.parent_id {
                    ensure_active_parent(uow.as_mut(), parent_id).await?;
                }
                node.parent_id
            }
        };

        let ids = uow.lock_subtree(node_id).await?.trashed_nodes();
        let restored = uow.clear_deleted(&ids).await?;
        let node = uow
            .find_node(node_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Node {node_id} vanished during restore")))?;
        uow.commit().await?;

        info!(
            node_id = %node_id,
            parent_id = ?parent_id,
            actor = %ctx.actor,
            restored,
            "Node restored"
        );
        self.audit
            .record(
                ctx,
                node_id,
                NodeAction::Restored,
                json!({ "restored": restored, "parent_id": parent_id }),
            )
            .await;

        Ok(node)
    }

    /// Permanently removes a trashed node and its subtree.
    pub async fn purge(&self, ctx: &RequestContext, node_id: NodeId) -> AppResult<PurgeSummary> {
        let mut uow = self.store.begin().await?;
        let node = checks::lock_trashed(uow.as_mut(), node_id).await?;
        self.guard
            .require(uow.as_mut(), &ctx.actor, &node, Operation::Purge)
            .await?;

        let purged = purge_subtree(uow.as_mut(), node_id).await?;
        uow.commit().await?;

        info!(node_id = %node_id, actor = %ctx.actor, nodes = purged.ids.len(), "Node purged");
        self.audit
            .record(
                ctx,
                node_id,
                NodeAction::PermanentlyDeleted,
                json!({ "nodes": purged.ids.len() }),
            )
            .await;
        self.after_purge(std::slice::from_ref(&purged)).await;

        Ok(PurgeSummary {
            roots: 1,
            nodes: purged.ids.len(),
        })
    }

    /// Purges every trashed node in the actor's scope, optionally only those
    /// trashed more than `older_than_days` ago.
    ///
    /// The scope is the actor's own trash, or the company's trash for a
    /// company manager acting under a company context.
    pub async fn empty_trash(
        &self,
        ctx: &RequestContext,
        older_than_days: Option<u32>,
    ) -> AppResult<PurgeSummary> {
        let Some(mut filter) = self.scope(ctx).await? else {
            return Ok(PurgeSummary::default());
        };
        filter.deleted_before = older_than_days
            .map(|days| Utc::now() - Duration::days(i64::from(days)));

        let (summary, purged) = self.purge_matching(&filter).await?;
        for (root, subtree) in &purged {
            self.audit
                .record(
                    ctx,
                    root.id,
                    NodeAction::PermanentlyDeleted,
                    json!({ "nodes": subtree.ids.len(), "bulk": true }),
                )
                .await;
        }
        let subtrees: Vec<PurgedSubtree> = purged.into_iter().map(|(_, s)| s).collect();
        self.after_purge(&subtrees).await;

        info!(actor = %ctx.actor, roots = summary.roots, nodes = summary.nodes, "Trash emptied");
        Ok(summary)
    }

    /// Purges every trashed node matching `filter` without an acting user.
    ///
    /// Used by the retention job and the admin CLI. Audit events are
    /// attributed to whoever trashed each node.
    pub async fn sweep(&self, filter: &TrashFilter) -> AppResult<PurgeSummary> {
        let (summary, purged) = self.purge_matching(&filter.to_node_filter()).await?;
        for (root, subtree) in &purged {
            let ctx = RequestContext::new(root.deleted_by().unwrap_or_else(|| root.owner()));
            self.audit
                .record(
                    &ctx,
                    root.id,
                    NodeAction::PermanentlyDeleted,
                    json!({ "nodes": subtree.ids.len(), "sweep": true }),
                )
                .await;
        }
        let subtrees: Vec<PurgedSubtree> = purged.into_iter().map(|(_, s)| s).collect();
        self.after_purge(&subtrees).await;

        info!(roots = summary.roots, nodes = summary.nodes, "Trash swept");
        Ok(summary)
    }

    /// Trashed nodes in the actor's scope, most recently trashed first.
    ///
    /// Without `parent_id` only trash roots are listed: nodes whose parent
    /// is not itself in the trash. With `parent_id` the trashed children of
    /// that folder are listed.
    pub async fn list_trash(
        &self,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
        query: &ListQuery,
    ) -> AppResult<Vec<TrashEntry>> {
        let Some(mut filter) = self.scope(ctx).await? else {
            return Ok(Vec::new());
        };
        filter = filter.query(query);
        if let Some(parent_id) = parent_id {
            filter = filter.parent(ParentScope::Of(parent_id));
        }

        let mut uow = self.store.begin().await?;
        let mut nodes = uow.find_nodes(&filter).await?;

        if parent_id.is_none() {
            let parents: Vec<NodeId> = nodes.iter().filter_map(|n| n.parent_id).collect();
            let trashed_parents: HashSet<NodeId> = if parents.is_empty() {
                HashSet::new()
            } else {
                let mut by_ids = NodeFilter::by_ids(parents);
                by_ids.trash = TrashState::Trashed;
                uow.find_nodes(&by_ids)
                    .await?
                    .into_iter()
                    .map(|n| n.id)
                    .collect()
            };
            nodes.retain(|n| n.parent_id.is_none_or(|p| !trashed_parents.contains(&p)));
        }

        let nodes = query.paginate(nodes);
        let folders: Vec<NodeId> = nodes
            .iter()
            .filter(|n| n.is_folder())
            .map(|n| n.id)
            .collect();
        let counts = if folders.is_empty() {
            Default::default()
        } else {
            uow.count_trashed_children(&folders).await?
        };
        uow.rollback().await?;

        Ok(nodes
            .into_iter()
            .map(|node| {
                let children_count = counts.get(&node.id).copied().unwrap_or(0);
                TrashEntry {
                    node,
                    children_count,
                }
            })
            .collect())
    }

    /// The trash an actor may see and empty, or `None` when it has no standing.
    async fn scope(&self, ctx: &RequestContext) -> AppResult<Option<NodeFilter>> {
        let actor = ctx.actor;
        match ctx.company_context {
            None => Ok(Some(
                NodeFilter::trashed()
                    .owned_by(actor)
                    .company(CompanyScope::PersonalOf(actor.id)),
            )),
            Some(company_id) => {
                let filter = NodeFilter::trashed().company(CompanyScope::Exactly(company_id));
                match self.guard.capabilities().capabilities(&actor, company_id).await? {
                    Some(caps) if caps.manage_files => Ok(Some(filter)),
                    Some(caps) if caps.sees_anything() => Ok(Some(filter.owned_by(actor))),
                    _ => Ok(None),
                }
            }
        }
    }

    /// Purge each match with its subtree in one unit of work.
    async fn purge_matching(
        &self,
        filter: &NodeFilter,
    ) -> AppResult<(PurgeSummary, Vec<(Node, PurgedSubtree)>)> {
        let mut uow = self.store.begin().await?;
        let candidates = uow.find_nodes(filter).await?;
        debug!(candidates = candidates.len(), "Purging matched trash");

        let mut gone: HashSet<NodeId> = HashSet::new();
        let mut purged = Vec::new();
        let mut summary = PurgeSummary::default();
        for root in candidates {
            if gone.contains(&root.id) {
                continue;
            }
            let subtree = purge_subtree(uow.as_mut(), root.id).await?;
            summary.roots += 1;
            summary.nodes += subtree.ids.len();
            gone.extend(subtree.ids.iter().copied());
            purged.push((root, subtree));
        }
        uow.commit().await?;

        Ok((summary, purged))
    }

    /// Best-effort cleanup once purges have committed.
    async fn after_purge(&self, purged: &[PurgedSubtree]) {
        let ids: Vec<NodeId> = purged.iter().flat_map(|p| p.ids.iter().copied()).collect();
        let refs: Vec<String> = purged.iter().flat_map(|p| p.blobs.iter().cloned()).collect();
        blobs::release(self.objects.as_ref(), &refs).await;
        self.deadlines.nodes_removed(&ids).await;
    }
}

/// Refuse to restore into a folder that is itself in the trash.
async fn ensure_active_parent(uow: &mut dyn UnitOfWork, parent_id: NodeId) -> AppResult<()> {
    match uow.find_node(parent_id).await? {
        Some(parent) if !parent.is_trashed() => Ok(()),
        _ => Err(AppError::conflict(format!(
            "Parent folder {parent_id} is in the trash; restore it first or choose a new parent"
        ))),
    }
}
