//! Decides which nodes an actor sees.
//!
//! Read paths never raise on missing access: an inaccessible parent or a
//! company the actor has no standing in yields an empty result, and a
//! single node the actor may not see is reported as not found.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::Capabilities;
use docvault_core::types::{Actor, ListQuery, NodeId};
use docvault_database::store::{CompanyScope, ParentScope};
use docvault_database::{NodeFilter, NodeStore, UnitOfWork};
use docvault_entity::follower::{FollowPreferences, Follower};
use docvault_entity::node::Node;

use super::enrich::{Enricher, NodeView};
use super::guard::AccessGuard;
use crate::context::RequestContext;

/// The access resolver.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    /// Node store.
    store: Arc<dyn NodeStore>,
    /// Capability resolution and visibility rule.
    guard: AccessGuard,
    /// Bulk enrichment.
    enricher: Enricher,
}

impl AccessResolver {
    /// Creates a new resolver.
    pub fn new(store: Arc<dyn NodeStore>, guard: AccessGuard, enricher: Enricher) -> Self {
        Self {
            store,
            guard,
            enricher,
        }
    }

    /// Children of `parent_id`, or the contextual root set when `None`, enriched.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
        query: &ListQuery,
    ) -> AppResult<Vec<NodeView>> {
        let mut uow = self.store.begin().await?;
        let nodes = self.visible_in(uow.as_mut(), ctx, parent_id, query).await?;
        let views = self.enricher.enrich(uow.as_mut(), &ctx.actor, nodes).await?;
        uow.rollback().await?;
        Ok(views)
    }

    /// Same selection as [`list`](Self::list), without enrichment.
    pub async fn visible_nodes(
        &self,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
        query: &ListQuery,
    ) -> AppResult<Vec<Node>> {
        let mut uow = self.store.begin().await?;
        let nodes = self.visible_in(uow.as_mut(), ctx, parent_id, query).await?;
        uow.rollback().await?;
        Ok(nodes)
    }

    /// One node with its enrichment.
    ///
    /// Owners opening a file they have never followed are subscribed with
    /// default preferences. That subscription is best-effort.
    pub async fn get_node(&self, ctx: &RequestContext, node_id: NodeId) -> AppResult<NodeView> {
        let actor = ctx.actor;
        let mut uow = self.store.begin().await?;

        let node = match uow.find_node(node_id).await? {
            Some(node) if !node.is_trashed() => node,
            _ => return Err(AppError::not_found(format!("Node {node_id} not found"))),
        };
        if !self.guard.can_view(uow.as_mut(), &actor, &node).await? {
            return Err(AppError::not_found(format!("Node {node_id} not found")));
        }

        let needs_follow = node.kind.is_file()
            && node.is_owned_by(&actor)
            && !uow
                .followers_for_nodes(&[node_id], false)
                .await?
                .iter()
                .any(|f| f.is_for(&actor));

        let mut view = self
            .enricher
            .enrich(uow.as_mut(), &actor, vec![node])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("Enrichment dropped the node"))?;
        uow.rollback().await?;

        if needs_follow {
            if let Some(follower) = self.auto_follow(node_id, &actor).await {
                view.followers.push(follower.clone());
                view.follower_count += 1;
                view.following = Some(follower);
            }
        }

        Ok(view)
    }

    /// Active nodes shared with the actor, enriched.
    ///
    /// With `root_only`, a node whose parent is itself shared with the actor
    /// is left out so each shared subtree appears once.
    pub async fn shared_with_me(
        &self,
        ctx: &RequestContext,
        root_only: bool,
        query: &ListQuery,
    ) -> AppResult<Vec<NodeView>> {
        let mut uow = self.store.begin().await?;
        let mut nodes = self
            .shared_set(uow.as_mut(), ctx, ParentScope::Any, root_only)
            .await?;
        nodes.retain(|n| n.matches(query));
        nodes.sort_by(Node::listing_order);
        let nodes = query.paginate(nodes);
        let views = self.enricher.enrich(uow.as_mut(), &ctx.actor, nodes).await?;
        uow.rollback().await?;
        Ok(views)
    }

    async fn visible_in(
        &self,
        uow: &mut dyn UnitOfWork,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
        query: &ListQuery,
    ) -> AppResult<Vec<Node>> {
        if let Some(parent_id) = parent_id {
            if let Some(children) = self.fast_path(uow, &ctx.actor, parent_id, query).await? {
                return Ok(children);
            }
            if ctx.company_context.is_none() {
                debug!(parent_id = %parent_id, actor = %ctx.actor, "Parent not accessible");
                return Ok(Vec::new());
            }
        }
        self.mixed_path(uow, ctx, parent_id, query).await
    }

    /// Children of a folder the actor owns or holds an edge on, whatever the
    /// company context. `None` when the parent is missing, trashed or not
    /// directly accessible.
    async fn fast_path(
        &self,
        uow: &mut dyn UnitOfWork,
        actor: &Actor,
        parent_id: NodeId,
        query: &ListQuery,
    ) -> AppResult<Option<Vec<Node>>> {
        let parent = match uow.find_node(parent_id).await? {
            Some(parent) if !parent.is_trashed() => parent,
            _ => return Ok(None),
        };
        let accessible = parent.is_owned_by(actor)
            || !uow.shares_for_grantee(actor, &[parent_id]).await?.is_empty();
        if !accessible {
            return Ok(None);
        }

        let filter = NodeFilter::active()
            .parent(ParentScope::Of(parent_id))
            .query(query)
            .page(query.effective_offset(), query.effective_limit());
        Ok(Some(uow.find_nodes(&filter).await?))
    }

    /// Union of the owned, shared and company-project sets.
    async fn mixed_path(
        &self,
        uow: &mut dyn UnitOfWork,
        ctx: &RequestContext,
        parent_id: Option<NodeId>,
        query: &ListQuery,
    ) -> AppResult<Vec<Node>> {
        let actor = ctx.actor;

        let capabilities = match ctx.company_context {
            Some(company_id) => {
                match self.guard.capabilities().capabilities(&actor, company_id).await? {
                    Some(caps) if caps.sees_anything() => Some(caps),
                    _ => {
                        debug!(company_id = %company_id, actor = %actor, "No standing in company");
                        return Ok(Vec::new());
                    }
                }
            }
            None => None,
        };

        if let Some(parent_id) = parent_id {
            if !self
                .parent_accessible(uow, ctx, parent_id, capabilities)
                .await?
            {
                return Ok(Vec::new());
            }
        }

        let flatten = parent_id.is_none() && query.search().is_some();
        let scope = match parent_id {
            Some(parent_id) => ParentScope::Of(parent_id),
            None if flatten => ParentScope::Any,
            None => ParentScope::Root,
        };

        let company = match ctx.company_context {
            Some(company_id) => CompanyScope::Exactly(company_id),
            None => CompanyScope::PersonalOf(actor.id),
        };
        let owned_filter = NodeFilter::active()
            .owned_by(actor)
            .company(company)
            .parent(scope)
            .query(query);
        let mut merged: HashMap<NodeId, Node> = uow
            .find_nodes(&owned_filter)
            .await?
            .into_iter()
            .map(|n| (n.id, n))
            .collect();

        let shared_scope = match parent_id {
            Some(parent_id) => ParentScope::Of(parent_id),
            None => ParentScope::Any,
        };
        let root_view = parent_id.is_none() && !flatten;
        for node in self.shared_set(uow, ctx, shared_scope, root_view).await? {
            if node.matches(query) {
                merged.entry(node.id).or_insert(node);
            }
        }

        if let (Some(company_id), Some(caps)) = (ctx.company_context, capabilities) {
            if caps.sees_project() {
                let project_filter = NodeFilter::active()
                    .company(CompanyScope::Exactly(company_id))
                    .parent(scope)
                    .query(query);
                for node in uow.find_nodes(&project_filter).await? {
                    merged.entry(node.id).or_insert(node);
                }
            }
        }

        let mut nodes: Vec<Node> = merged.into_values().collect();
        nodes.sort_by(Node::listing_order);
        Ok(query.paginate(nodes))
    }

    /// Active nodes shared with the actor, narrowed to the company under a company context.
    async fn shared_set(
        &self,
        uow: &mut dyn UnitOfWork,
        ctx: &RequestContext,
        scope: ParentScope,
        top_level_only: bool,
    ) -> AppResult<Vec<Node>> {
        let mut filter = NodeFilter::active().shared_with(ctx.actor).parent(scope);
        if let Some(company_id) = ctx.company_context {
            filter = filter.company(CompanyScope::Exactly(company_id));
        }
        let mut nodes = uow.find_nodes(&filter).await?;
        if top_level_only {
            let shared: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();
            nodes.retain(|n| n.parent_id.is_none_or(|p| !shared.contains(&p)));
        }
        Ok(nodes)
    }

    /// Whether the actor may browse `parent_id` under the current context.
    async fn parent_accessible(
        &self,
        uow: &mut dyn UnitOfWork,
        ctx: &RequestContext,
        parent_id: NodeId,
        capabilities: Option<Capabilities>,
    ) -> AppResult<bool> {
        let parent = match uow.find_node(parent_id).await? {
            Some(parent) if !parent.is_trashed() => parent,
            _ => return Ok(false),
        };
        if parent.is_owned_by(&ctx.actor) {
            return Ok(true);
        }
        let in_project = capabilities.is_some_and(|c| c.sees_project())
            && parent.company_id.is_some()
            && parent.company_id == ctx.company_context;
        if in_project {
            return Ok(true);
        }
        Ok(!uow
            .shares_for_grantee(&ctx.actor, &[parent_id])
            .await?
            .is_empty())
    }

    async fn auto_follow(&self, node_id: NodeId, actor: &Actor) -> Option<Follower> {
        let result = async {
            let mut uow = self.store.begin().await?;
            let follower = uow
                .upsert_follower(node_id, actor, FollowPreferences::default())
                .await?;
            uow.commit().await?;
            Ok::<_, AppError>(follower)
        }
        .await;

        match result {
            Ok(follower) => {
                debug!(node_id = %node_id, actor = %actor, "Owner subscribed to file");
                Some(follower)
            }
            Err(e) => {
                warn!(node_id = %node_id, actor = %actor, error = %e, "Owner auto-follow failed");
                None
            }
        }
    }
}
