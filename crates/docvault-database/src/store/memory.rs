//! Process-local node store.
//!
//! A unit of work holds the store mutex for its whole lifetime and mutates
//! a private copy of the state, which replaces the shared state on commit.
//! Units of work are therefore fully serialized, a stronger guarantee than
//! the row locks of the Postgres store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::{Actor, FollowerId, NodeId, ShareId};
use docvault_entity::follower::{FollowPreferences, Follower};
use docvault_entity::node::{DeletionStamp, NewNode, Node, SubtreeIndex, TreeLink};
use docvault_entity::share::{Share, ShareGrant};

use super::{MAX_TREE_DEPTH, NodeFilter, NodeStore, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    nodes: BTreeMap<NodeId, Node>,
    shares: BTreeMap<ShareId, Share>,
    followers: BTreeMap<FollowerId, Follower>,
    last_node_id: i64,
    last_share_id: i64,
    last_follower_id: i64,
}

impl MemoryState {
    fn node_mut(&mut self, id: NodeId) -> AppResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))
    }

    fn has_share(&self, node_id: NodeId, grantee: &Actor) -> bool {
        self.shares
            .values()
            .any(|s| s.node_id == node_id && s.is_for(grantee))
    }
}

/// In-memory [`NodeStore`] for development and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, work }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Unit of work over a [`MemoryNodeStore`].
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_node(&mut self, id: NodeId) -> AppResult<Option<Node>> {
        Ok(self.work.nodes.get(&id).cloned())
    }

    async fn lock_node(&mut self, id: NodeId) -> AppResult<Option<Node>> {
        Ok(self.work.nodes.get(&id).cloned())
    }

    async fn find_nodes(&mut self, filter: &NodeFilter) -> AppResult<Vec<Node>> {
        let shared: Option<HashSet<NodeId>> = filter.shared_with.map(|grantee| {
            self.work
                .shares
                .values()
                .filter(|s| s.is_for(&grantee))
                .map(|s| s.node_id)
                .collect()
        });
        let rows = self
            .work
            .nodes
            .values()
            .filter(|n| filter.matches_row(n))
            .filter(|n| shared.as_ref().is_none_or(|ids| ids.contains(&n.id)))
            .cloned()
            .collect();
        Ok(filter.arrange(rows))
    }

    async fn insert_node(&mut self, node: NewNode) -> AppResult<Node> {
        self.work.last_node_id += 1;
        let id = NodeId(self.work.last_node_id);
        let row = node.into_node(id, Utc::now());
        self.work.nodes.insert(id, row.clone());
        Ok(row)
    }

    async fn update_node(&mut self, node: &Node) -> AppResult<Node> {
        let row = self.work.node_mut(node.id)?;
        row.name = node.name.clone();
        row.owner_id = node.owner_id;
        row.owner_kind = node.owner_kind;
        row.size_bytes = node.size_bytes;
        row.extension = node.extension.clone();
        row.content_ref = node.content_ref.clone();
        row.expires_on = node.expires_on;
        row.status = node.status.clone();
        row.comments = node.comments.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn set_parent(&mut self, id: NodeId, parent_id: Option<NodeId>) -> AppResult<Node> {
        let row = self.work.node_mut(id)?;
        row.parent_id = parent_id;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn ancestor_ids(&mut self, id: NodeId) -> AppResult<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = self.work.nodes.get(&id);
        while let Some(node) = cursor {
            if !seen.insert(node.id) || chain.len() >= MAX_TREE_DEPTH {
                break;
            }
            chain.push(node.id);
            cursor = node.parent_id.and_then(|p| self.work.nodes.get(&p));
        }
        Ok(chain)
    }

    async fn subtree(&mut self, root: NodeId) -> AppResult<SubtreeIndex> {
        let mut children: HashMap<NodeId, Vec<&Node>> = HashMap::new();
        for node in self.work.nodes.values() {
            if let Some(parent) = node.parent_id {
                children.entry(parent).or_default().push(node);
            }
        }
        let mut links = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<&Node> = self.work.nodes.get(&root).into_iter().collect();
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id) {
                continue;
            }
            links.push(TreeLink {
                id: node.id,
                parent_id: node.parent_id,
                kind: node.kind,
                deleted_at: node.deleted_at,
            });
            if let Some(kids) = children.get(&node.id) {
                stack.extend(kids.iter().copied());
            }
        }
        debug!(root = %root, size = links.len(), "Loaded subtree");
        Ok(SubtreeIndex::build(root, links))
    }

    async fn lock_ancestors(&mut self, id: NodeId) -> AppResult<Vec<NodeId>> {
        self.ancestor_ids(id).await
    }

    async fn lock_subtree(&mut self, root: NodeId) -> AppResult<SubtreeIndex> {
        self.subtree(root).await
    }

    async fn mark_deleted(&mut self, ids: &[NodeId], stamp: DeletionStamp) -> AppResult<u64> {
        let mut affected = 0;
        for id in ids {
            if let Some(node) = self.work.nodes.get_mut(id) {
                if node.deleted_at.is_none() {
                    node.deleted_at = Some(stamp.at);
                    node.deleted_by_id = Some(stamp.by.id);
                    node.deleted_by_kind = Some(stamp.by.kind);
                    node.updated_at = stamp.at;
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    async fn clear_deleted(&mut self, ids: &[NodeId]) -> AppResult<u64> {
        let now = Utc::now();
        let mut affected = 0;
        for id in ids {
            if let Some(node) = self.work.nodes.get_mut(id) {
                if node.deleted_at.is_some() {
                    node.deleted_at = None;
                    node.deleted_by_id = None;
                    node.deleted_by_kind = None;
                    node.updated_at = now;
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    async fn delete_nodes(&mut self, ids: &[NodeId]) -> AppResult<u64> {
        let doomed: HashSet<&NodeId> = ids.iter().collect();
        if let Some(orphan) = self
            .work
            .nodes
            .values()
            .find(|n| !doomed.contains(&n.id) && n.parent_id.is_some_and(|p| doomed.contains(&p)))
        {
            return Err(AppError::conflict(format!(
                "Node {} still references a deleted parent",
                orphan.id
            )));
        }
        let before = self.work.nodes.len();
        self.work.nodes.retain(|id, _| !doomed.contains(id));
        Ok((before - self.work.nodes.len()) as u64)
    }

    async fn count_trashed_children(
        &mut self,
        parents: &[NodeId],
    ) -> AppResult<HashMap<NodeId, i64>> {
        let wanted: HashSet<&NodeId> = parents.iter().collect();
        let mut counts = HashMap::new();
        for node in self.work.nodes.values() {
            if let Some(parent) = node.parent_id {
                if node.is_trashed() && wanted.contains(&parent) {
                    *counts.entry(parent).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }

    async fn shares_for_node(&mut self, node_id: NodeId) -> AppResult<Vec<Share>> {
        Ok(self
            .work
            .shares
            .values()
            .filter(|s| s.node_id == node_id)
            .cloned()
            .collect())
    }

    async fn shares_for_grantee(
        &mut self,
        grantee: &Actor,
        node_ids: &[NodeId],
    ) -> AppResult<Vec<Share>> {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        Ok(self
            .work
            .shares
            .values()
            .filter(|s| s.is_for(grantee) && wanted.contains(&s.node_id))
            .cloned()
            .collect())
    }

    async fn upsert_shares(&mut self, node_ids: &[NodeId], grant: &ShareGrant) -> AppResult<u64> {
        let now = Utc::now();
        let mut affected = 0;
        for node_id in node_ids {
            let existing = self
                .work
                .shares
                .values_mut()
                .find(|s| s.node_id == *node_id && s.is_for(&grant.grantee));
            match existing {
                Some(share) => share.edit_allowed = grant.edit_allowed,
                None => {
                    self.work.last_share_id += 1;
                    let id = ShareId(self.work.last_share_id);
                    self.work
                        .shares
                        .insert(id, grant.into_share(id, *node_id, now));
                }
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn inherit_shares(&mut self, node_id: NodeId, parent_id: NodeId) -> AppResult<u64> {
        let now = Utc::now();
        let grants: Vec<ShareGrant> = self
            .work
            .shares
            .values()
            .filter(|s| s.node_id == parent_id)
            .map(Share::grant)
            .collect();
        let mut inserted = 0;
        for grant in grants {
            if self.work.has_share(node_id, &grant.grantee) {
                continue;
            }
            self.work.last_share_id += 1;
            let id = ShareId(self.work.last_share_id);
            self.work.shares.insert(id, grant.into_share(id, node_id, now));
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn delete_shares(&mut self, node_ids: &[NodeId], grantee: &Actor) -> AppResult<u64> {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        let before = self.work.shares.len();
        self.work
            .shares
            .retain(|_, s| !(wanted.contains(&s.node_id) && s.is_for(grantee)));
        Ok((before - self.work.shares.len()) as u64)
    }

    async fn delete_shares_for_nodes(&mut self, node_ids: &[NodeId]) -> AppResult<u64> {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        let before = self.work.shares.len();
        self.work.shares.retain(|_, s| !wanted.contains(&s.node_id));
        Ok((before - self.work.shares.len()) as u64)
    }

    async fn followers_for_nodes(
        &mut self,
        node_ids: &[NodeId],
        active_only: bool,
    ) -> AppResult<Vec<Follower>> {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        Ok(self
            .work
            .followers
            .values()
            .filter(|f| wanted.contains(&f.node_id) && (f.active || !active_only))
            .cloned()
            .collect())
    }

    async fn upsert_follower(
        &mut self,
        node_id: NodeId,
        actor: &Actor,
        prefs: FollowPreferences,
    ) -> AppResult<Follower> {
        let now = Utc::now();
        if let Some(existing) = self
            .work
            .followers
            .values_mut()
            .find(|f| f.node_id == node_id && f.is_for(actor))
        {
            existing.days_before_alert = prefs.days_before_alert;
            existing.alert_on_expiry = prefs.alert_on_expiry;
            existing.active = true;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        self.work.last_follower_id += 1;
        let id = FollowerId(self.work.last_follower_id);
        let follower = Follower {
            id,
            node_id,
            actor_id: actor.id,
            actor_kind: actor.kind,
            days_before_alert: prefs.days_before_alert,
            alert_on_expiry: prefs.alert_on_expiry,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.work.followers.insert(id, follower.clone());
        Ok(follower)
    }

    async fn deactivate_follower(&mut self, node_id: NodeId, actor: &Actor) -> AppResult<bool> {
        match self
            .work
            .followers
            .values_mut()
            .find(|f| f.node_id == node_id && f.is_for(actor) && f.active)
        {
            Some(follower) => {
                follower.active = false;
                follower.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_followers_for_nodes(&mut self, node_ids: &[NodeId]) -> AppResult<u64> {
        let wanted: HashSet<&NodeId> = node_ids.iter().collect();
        let before = self.work.followers.len();
        self.work.followers.retain(|_, f| !wanted.contains(&f.node_id));
        Ok((before - self.work.followers.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
