//! The node store seam.
//!
//! Every logical operation opens one [`UnitOfWork`], performs all of its
//! reads and writes through it and commits once. Dropping a unit of work
//! without committing discards everything it wrote.

pub mod filter;
pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;

use docvault_core::result::AppResult;
use docvault_core::types::{Actor, NodeId};
use docvault_entity::follower::{FollowPreferences, Follower};
use docvault_entity::node::{DeletionStamp, NewNode, Node, SubtreeIndex};
use docvault_entity::share::{Share, ShareGrant};

pub use filter::{CompanyScope, NodeFilter, NodeOrder, ParentScope, TrashState};
pub use memory::MemoryNodeStore;
pub use postgres::PgNodeStore;

/// Upper bound on parent chain walks. A chain longer than this is treated as corrupted.
pub const MAX_TREE_DEPTH: usize = 1024;

/// Re-reads allowed while a locked chain or subtree keeps changing underneath.
pub const LOCK_ATTEMPTS: usize = 8;

/// Factory for units of work.
#[async_trait]
pub trait NodeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Open a new unit of work.
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Check whether the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// One atomic unit of work over nodes, shares and followers.
#[async_trait]
pub trait UnitOfWork: Send {
    // -- nodes ---------------------------------------------------------

    /// Read a node, trashed or not.
    async fn find_node(&mut self, id: NodeId) -> AppResult<Option<Node>>;

    /// Read a node and hold a write lock on it until the unit of work ends.
    async fn lock_node(&mut self, id: NodeId) -> AppResult<Option<Node>>;

    /// Nodes matching `filter`, in the filter's order.
    async fn find_nodes(&mut self, filter: &NodeFilter) -> AppResult<Vec<Node>>;

    /// Insert a node and return the stored row.
    async fn insert_node(&mut self, node: NewNode) -> AppResult<Node>;

    /// Persist the mutable attributes of `node`.
    async fn update_node(&mut self, node: &Node) -> AppResult<Node>;

    /// Rewrite the parent of a node.
    async fn set_parent(&mut self, id: NodeId, parent_id: Option<NodeId>) -> AppResult<Node>;

    /// `id` followed by its ancestors up to the root, at most [`MAX_TREE_DEPTH`] entries.
    async fn ancestor_ids(&mut self, id: NodeId) -> AppResult<Vec<NodeId>>;

    /// Load the subtree rooted at `root` as an adjacency index.
    async fn subtree(&mut self, root: NodeId) -> AppResult<SubtreeIndex>;

    /// [`ancestor_ids`](Self::ancestor_ids), with every row of the chain
    /// share-locked until the unit of work ends.
    ///
    /// Concurrent moves touching the chain wait, so a cycle check made on
    /// the returned chain still holds at commit.
    async fn lock_ancestors(&mut self, id: NodeId) -> AppResult<Vec<NodeId>>;

    /// [`subtree`](Self::subtree), with every row of the subtree locked for
    /// update until the unit of work ends.
    ///
    /// No child can be created under, moved into or moved out of the
    /// returned subtree while the lock is held.
    async fn lock_subtree(&mut self, root: NodeId) -> AppResult<SubtreeIndex>;

    /// Stamp the still-active nodes among `ids` as trashed.
    async fn mark_deleted(&mut self, ids: &[NodeId], stamp: DeletionStamp) -> AppResult<u64>;

    /// Clear the trash stamp of `ids`.
    async fn clear_deleted(&mut self, ids: &[NodeId]) -> AppResult<u64>;

    /// Remove node rows.
    async fn delete_nodes(&mut self, ids: &[NodeId]) -> AppResult<u64>;

    /// Number of trashed direct children for each of `parents`. Missing keys mean zero.
    async fn count_trashed_children(
        &mut self,
        parents: &[NodeId],
    ) -> AppResult<HashMap<NodeId, i64>>;

    // -- shares --------------------------------------------------------

    /// Every edge on a node.
    async fn shares_for_node(&mut self, node_id: NodeId) -> AppResult<Vec<Share>>;

    /// Edges naming `grantee` on any of `node_ids`.
    async fn shares_for_grantee(
        &mut self,
        grantee: &Actor,
        node_ids: &[NodeId],
    ) -> AppResult<Vec<Share>>;

    /// Upsert `grant` on each of `node_ids`; an existing edge for the grantee gets the new `edit_allowed`.
    async fn upsert_shares(&mut self, node_ids: &[NodeId], grant: &ShareGrant) -> AppResult<u64>;

    /// Copy every edge of `parent_id` onto `node_id`, skipping grantees already present.
    async fn inherit_shares(&mut self, node_id: NodeId, parent_id: NodeId) -> AppResult<u64>;

    /// Remove the edges naming `grantee` from `node_ids`.
    async fn delete_shares(&mut self, node_ids: &[NodeId], grantee: &Actor) -> AppResult<u64>;

    /// Remove every edge on `node_ids`.
    async fn delete_shares_for_nodes(&mut self, node_ids: &[NodeId]) -> AppResult<u64>;

    // -- followers -----------------------------------------------------

    /// Follower records of `node_ids`.
    async fn followers_for_nodes(
        &mut self,
        node_ids: &[NodeId],
        active_only: bool,
    ) -> AppResult<Vec<Follower>>;

    /// Create or reactivate `actor`'s record on `node_id`.
    async fn upsert_follower(
        &mut self,
        node_id: NodeId,
        actor: &Actor,
        prefs: FollowPreferences,
    ) -> AppResult<Follower>;

    /// Deactivate `actor`'s record. Returns false when there was no active record.
    async fn deactivate_follower(&mut self, node_id: NodeId, actor: &Actor) -> AppResult<bool>;

    /// Remove every follower record of `node_ids`.
    async fn delete_followers_for_nodes(&mut self, node_ids: &[NodeId]) -> AppResult<u64>;

    // -- lifecycle -----------------------------------------------------

    /// Make every write visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
