//! In-memory adjacency index over one subtree.
//!
//! Cascades (soft delete, restore, purge, share, unshare) load the subtree
//! rooted at the target node in a single query, build a [`SubtreeIndex`]
//! and walk it with an explicit stack. A visited set guards against a
//! corrupted parent chain so a walk always terminates.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docvault_core::types::{NodeId, NodeKind};

/// The slice of a node row a traversal needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TreeLink {
    /// Node id.
    pub id: NodeId,
    /// Parent id.
    pub parent_id: Option<NodeId>,
    /// File or folder.
    pub kind: NodeKind,
    /// Trash stamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TreeLink {
    /// Whether the node is in the trash.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Parent to children adjacency for the subtree under `root`.
#[derive(Debug, Clone)]
pub struct SubtreeIndex {
    root: NodeId,
    links: HashMap<NodeId, TreeLink>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl SubtreeIndex {
    /// Build the index from the root row and its descendants, in any order.
    pub fn build(root: NodeId, links: impl IntoIterator<Item = TreeLink>) -> Self {
        let mut by_id = HashMap::new();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for link in links {
            if link.id != root {
                if let Some(parent) = link.parent_id {
                    children.entry(parent).or_default().push(link.id);
                }
            }
            by_id.insert(link.id, link);
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
        Self {
            root,
            links: by_id,
            children,
        }
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Row for `id`, if it belongs to the subtree.
    pub fn get(&self, id: NodeId) -> Option<&TreeLink> {
        self.links.get(&id)
    }

    /// Whether `id` is the root or one of its descendants.
    pub fn contains(&self, id: NodeId) -> bool {
        self.preorder().contains(&id)
    }

    /// Direct children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Root first, then every reachable descendant, parents before children.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.links.len());
        let mut visited = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            for child in self.children(id).iter().rev() {
                if !visited.contains(child) {
                    stack.push(*child);
                }
            }
        }
        order
    }

    /// Every reachable descendant, excluding the root.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = self.preorder();
        order.remove(0);
        order
    }

    /// Children before parents, root last.
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.links.len());
        let mut visited = HashSet::new();
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for child in self.children(id).iter().rev() {
                if !visited.contains(child) {
                    stack.push((*child, false));
                }
            }
        }
        order
    }

    /// Descendants still active, excluding the root.
    pub fn active_descendants(&self) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|l| !l.is_trashed()))
            .collect()
    }

    /// Root plus descendants still in the trash.
    pub fn trashed_nodes(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(TreeLink::is_trashed))
            .collect()
    }

    /// Number of rows loaded.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
