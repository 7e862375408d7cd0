//! Node selection criteria understood by every store.

use chrono::{DateTime, Utc};

use docvault_core::types::{Actor, ActorId, ListQuery, NodeId};
use docvault_entity::node::Node;

/// Where in the tree to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentScope {
    /// Anywhere.
    #[default]
    Any,
    /// Top-level nodes only.
    Root,
    /// Direct children of a folder.
    Of(NodeId),
}

/// Company narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompanyScope {
    /// No narrowing.
    #[default]
    Any,
    /// `company_id = id`.
    Exactly(ActorId),
    /// `company_id IS NULL OR company_id = id`: an actor's personal space.
    PersonalOf(ActorId),
}

/// Trash state narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashState {
    /// Active nodes only.
    #[default]
    Active,
    /// Trashed nodes only.
    Trashed,
    /// Both.
    Any,
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeOrder {
    /// Folders first, then by name.
    #[default]
    Listing,
    /// Most recently trashed first.
    DeletedDesc,
}

/// Conjunction of optional criteria. The default selects every active node.
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    /// Parent scope.
    pub parent: ParentScope,
    /// Owner.
    pub owner: Option<Actor>,
    /// Owner id regardless of kind.
    pub owner_id: Option<ActorId>,
    /// Company narrowing.
    pub company: CompanyScope,
    /// Restrict to these ids.
    pub ids: Option<Vec<NodeId>>,
    /// Trash state.
    pub trash: TrashState,
    /// Who trashed the node.
    pub deleted_by: Option<Actor>,
    /// Trashed strictly before this instant.
    pub deleted_before: Option<DateTime<Utc>>,
    /// Nodes with a share edge naming this actor.
    pub shared_with: Option<Actor>,
    /// Status, kind and search filters. Pagination fields are ignored here.
    pub query: Option<ListQuery>,
    /// Ordering.
    pub order: NodeOrder,
    /// Rows to skip after ordering.
    pub offset: Option<usize>,
    /// Maximum number of rows.
    pub limit: Option<usize>,
}

impl NodeFilter {
    /// Active nodes.
    pub fn active() -> Self {
        Self::default()
    }

    /// Trashed nodes, most recently trashed first.
    pub fn trashed() -> Self {
        Self {
            trash: TrashState::Trashed,
            order: NodeOrder::DeletedDesc,
            ..Self::default()
        }
    }

    /// Exactly these nodes, in any trash state.
    pub fn by_ids(ids: Vec<NodeId>) -> Self {
        Self {
            ids: Some(ids),
            trash: TrashState::Any,
            ..Self::default()
        }
    }

    /// Narrow to a parent scope.
    pub fn parent(mut self, scope: ParentScope) -> Self {
        self.parent = scope;
        self
    }

    /// Narrow to an owner.
    pub fn owned_by(mut self, owner: Actor) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Narrow to a company scope.
    pub fn company(mut self, scope: CompanyScope) -> Self {
        self.company = scope;
        self
    }

    /// Narrow to nodes shared with `actor`.
    pub fn shared_with(mut self, actor: Actor) -> Self {
        self.shared_with = Some(actor);
        self
    }

    /// Apply listing filters.
    pub fn query(mut self, query: &ListQuery) -> Self {
        self.query = Some(query.clone());
        self
    }

    /// Apply a page window.
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    /// Whether `node` passes every criterion except `shared_with`, which needs the share table.
    pub fn matches_row(&self, node: &Node) -> bool {
        let parent_ok = match self.parent {
            ParentScope::Any => true,
            ParentScope::Root => node.parent_id.is_none(),
            ParentScope::Of(id) => node.parent_id == Some(id),
        };
        let company_ok = match self.company {
            CompanyScope::Any => true,
            CompanyScope::Exactly(id) => node.company_id == Some(id),
            CompanyScope::PersonalOf(id) => node.company_id.is_none_or(|c| c == id),
        };
        let trash_ok = match self.trash {
            TrashState::Active => !node.is_trashed(),
            TrashState::Trashed => node.is_trashed(),
            TrashState::Any => true,
        };
        parent_ok
            && company_ok
            && trash_ok
            && self.owner.is_none_or(|o| node.is_owned_by(&o))
            && self.owner_id.is_none_or(|id| node.owner_id == id)
            && self.ids.as_ref().is_none_or(|ids| ids.contains(&node.id))
            && self.deleted_by.is_none_or(|by| node.deleted_by() == Some(by))
            && self
                .deleted_before
                .is_none_or(|cutoff| node.deleted_at.is_some_and(|at| at < cutoff))
            && self.query.as_ref().is_none_or(|q| node.matches(q))
    }

    /// Sort and window rows the way the SQL store does.
    pub fn arrange(&self, mut nodes: Vec<Node>) -> Vec<Node> {
        match self.order {
            NodeOrder::Listing => nodes.sort_by(Node::listing_order),
            NodeOrder::DeletedDesc => nodes.sort_by(|a, b| {
                b.deleted_at
                    .cmp(&a.deleted_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        nodes.into_iter().skip(offset).take(limit).collect()
    }
}
