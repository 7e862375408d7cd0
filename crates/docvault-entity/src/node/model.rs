//! Node entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docvault_core::types::{Actor, ActorId, ActorKind, ListQuery, NodeId, NodeKind};

/// Status label given to nodes created without one.
pub const DEFAULT_STATUS: &str = "valid";

/// A file or folder in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// File or folder.
    pub kind: NodeKind,
    /// Display name.
    pub name: String,
    /// Parent folder (null for tree roots).
    pub parent_id: Option<NodeId>,
    /// The actor who created the node.
    pub owner_id: ActorId,
    /// Kind of the owning actor.
    pub owner_kind: ActorKind,
    /// Company workspace the node belongs to, if any.
    pub company_id: Option<ActorId>,
    /// Kind of the company actor.
    pub company_kind: Option<ActorKind>,
    /// Content size in bytes (files only).
    pub size_bytes: Option<i64>,
    /// Lower-cased extension including the dot (files only).
    pub extension: Option<String>,
    /// Object store key or URL of the content (files only).
    pub content_ref: Option<String>,
    /// Expiry date tracked by the deadline notifier (files only).
    pub expires_on: Option<NaiveDate>,
    /// Free-form classification label.
    pub status: String,
    /// Free-form comments.
    pub comments: Option<String>,
    /// When the node went to the trash.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who put the node in the trash.
    pub deleted_by_id: Option<ActorId>,
    /// Kind of the actor who put the node in the trash.
    pub deleted_by_kind: Option<ActorKind>,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// The owning actor.
    pub fn owner(&self) -> Actor {
        Actor::new(self.owner_id, self.owner_kind)
    }

    /// Whether `actor` owns this node.
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        self.owner_id == actor.id && self.owner_kind == actor.kind
    }

    /// Whether the node is in the trash.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Whether the node is a tree root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Who trashed the node, if it is in the trash.
    pub fn deleted_by(&self) -> Option<Actor> {
        match (self.deleted_by_id, self.deleted_by_kind) {
            (Some(id), Some(kind)) => Some(Actor::new(id, kind)),
            _ => None,
        }
    }

    /// Whether the node passes the listing filters.
    pub fn matches(&self, query: &ListQuery) -> bool {
        query.accepts(self.kind, &self.status, &self.name, self.comments.as_deref())
    }

    /// Listing order: folders first, then by name.
    pub fn listing_order(a: &Node, b: &Node) -> std::cmp::Ordering {
        b.kind
            .is_folder()
            .cmp(&a.kind.is_folder())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Who trashed a subtree, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionStamp {
    /// When.
    pub at: DateTime<Utc>,
    /// Who.
    pub by: Actor,
}

impl DeletionStamp {
    /// A stamp for `by` at the current time.
    pub fn now(by: Actor) -> Self {
        Self { at: Utc::now(), by }
    }
}

/// Data required to create a new node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
    /// File or folder.
    pub kind: NodeKind,
    /// Display name.
    pub name: String,
    /// Parent folder (None for a root node).
    pub parent_id: Option<NodeId>,
    /// Owning actor.
    pub owner: Actor,
    /// Company workspace.
    pub company_id: Option<ActorId>,
    /// Kind of the company actor.
    pub company_kind: Option<ActorKind>,
    /// Content size in bytes.
    pub size_bytes: Option<i64>,
    /// File extension.
    pub extension: Option<String>,
    /// Object store reference.
    pub content_ref: Option<String>,
    /// Expiry date.
    pub expires_on: Option<NaiveDate>,
    /// Status label.
    pub status: String,
    /// Comments.
    pub comments: Option<String>,
}

impl NewNode {
    /// A node of `kind` named `name` owned by `owner`, at the root, with default attributes.
    pub fn new(kind: NodeKind, name: impl Into<String>, owner: Actor) -> Self {
        Self {
            kind,
            name: name.into(),
            parent_id: None,
            owner,
            company_id: None,
            company_kind: None,
            size_bytes: None,
            extension: None,
            content_ref: None,
            expires_on: None,
            status: DEFAULT_STATUS.to_string(),
            comments: None,
        }
    }

    /// A folder.
    pub fn folder(name: impl Into<String>, owner: Actor) -> Self {
        Self::new(NodeKind::Folder, name, owner)
    }

    /// A file.
    pub fn file(name: impl Into<String>, owner: Actor) -> Self {
        Self::new(NodeKind::File, name, owner)
    }

    /// Place the node under `parent_id`.
    pub fn under(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Scope the node to a company workspace.
    pub fn in_company(mut self, company: Actor) -> Self {
        self.company_id = Some(company.id);
        self.company_kind = Some(company.kind);
        self
    }

    /// Attach content metadata.
    pub fn with_content(mut self, content_ref: impl Into<String>, size_bytes: i64, extension: Option<String>) -> Self {
        self.content_ref = Some(content_ref.into());
        self.size_bytes = Some(size_bytes);
        self.extension = extension;
        self
    }

    /// Materialize the row as the store would, with the given id and time.
    pub fn into_node(self, id: NodeId, now: DateTime<Utc>) -> Node {
        Node {
            id,
            kind: self.kind,
            name: self.name,
            parent_id: self.parent_id,
            owner_id: self.owner.id,
            owner_kind: self.owner.kind,
            company_id: self.company_id,
            company_kind: self.company_kind,
            size_bytes: self.size_bytes,
            extension: self.extension,
            content_ref: self.content_ref,
            expires_on: self.expires_on,
            status: self.status,
            comments: self.comments,
            deleted_at: None,
            deleted_by_id: None,
            deleted_by_kind: None,
            created_at: now,
            updated_at: now,
        }
    }
}
