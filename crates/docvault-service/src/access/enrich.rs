//! Batch enrichment of listed nodes.
//!
//! Every per-node fact is resolved with one bulk lookup per fact type
//! across the whole candidate set.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use docvault_auth::AccessFacts;
use docvault_core::result::AppResult;
use docvault_core::traits::{Capabilities, ObjectStore};
use docvault_core::types::{Actor, ActorId, NodeId};
use docvault_database::UnitOfWork;
use docvault_entity::follower::Follower;
use docvault_entity::node::Node;
use docvault_entity::share::Share;

use super::guard::AccessGuard;

/// A node as presented to one actor.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    /// The node row.
    #[serde(flatten)]
    pub node: Node,
    /// Whether the actor may modify the node.
    pub editable: bool,
    /// Whether the actor owns the node.
    pub is_owner: bool,
    /// Active followers (files only).
    pub followers: Vec<Follower>,
    /// Number of active followers.
    pub follower_count: usize,
    /// The actor's own active follower record.
    pub following: Option<Follower>,
    /// Who shared the node with the actor.
    pub shared_by: Option<Actor>,
    /// Public URL of the content.
    pub public_url: Option<String>,
}

/// Computes [`NodeView`]s in bulk.
#[derive(Debug, Clone)]
pub struct Enricher {
    /// Capability resolution and the editable rule.
    guard: AccessGuard,
    /// Resolves content keys to URLs.
    objects: Arc<dyn ObjectStore>,
}

impl Enricher {
    /// Creates an enricher.
    pub fn new(guard: AccessGuard, objects: Arc<dyn ObjectStore>) -> Self {
        Self { guard, objects }
    }

    /// Public URL of a content reference. Absolute URLs pass through.
    pub fn public_url(&self, content_ref: &str) -> String {
        if content_ref.starts_with("http://") || content_ref.starts_with("https://") {
            content_ref.to_string()
        } else {
            self.objects.public_url(content_ref)
        }
    }

    /// Enrich `nodes` for `actor`, keeping their order.
    pub async fn enrich(
        &self,
        uow: &mut dyn UnitOfWork,
        actor: &Actor,
        nodes: Vec<Node>,
    ) -> AppResult<Vec<NodeView>> {
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
        let file_ids: Vec<NodeId> = nodes
            .iter()
            .filter(|n| n.kind.is_file())
            .map(|n| n.id)
            .collect();

        let shares: HashMap<NodeId, Share> = uow
            .shares_for_grantee(actor, &ids)
            .await?
            .into_iter()
            .map(|s| (s.node_id, s))
            .collect();

        let mut followers: HashMap<NodeId, Vec<Follower>> = HashMap::new();
        if !file_ids.is_empty() {
            for follower in uow.followers_for_nodes(&file_ids, true).await? {
                followers.entry(follower.node_id).or_default().push(follower);
            }
        }

        let companies: BTreeSet<ActorId> = nodes
            .iter()
            .filter(|n| !n.is_owned_by(actor))
            .filter_map(|n| n.company_id)
            .collect();
        let mut capabilities: HashMap<ActorId, Option<Capabilities>> = HashMap::new();
        for company_id in companies {
            let caps = self
                .guard
                .capabilities()
                .capabilities(actor, company_id)
                .await?;
            capabilities.insert(company_id, caps);
        }

        let views = nodes
            .into_iter()
            .map(|node| {
                let share = shares.get(&node.id);
                let caps = node
                    .company_id
                    .and_then(|c| capabilities.get(&c).copied().flatten());
                let facts = AccessFacts::new(share, caps);
                let editable = self.guard.policy().editable(actor, &node, &facts);
                let node_followers = followers.remove(&node.id).unwrap_or_default();
                let following = node_followers.iter().find(|f| f.is_for(actor)).cloned();
                let public_url = node.content_ref.as_deref().map(|r| self.public_url(r));

                NodeView {
                    editable,
                    is_owner: node.is_owned_by(actor),
                    follower_count: node_followers.len(),
                    followers: node_followers,
                    following,
                    shared_by: share.map(Share::grantor),
                    public_url,
                    node,
                }
            })
            .collect();

        Ok(views)
    }
}
