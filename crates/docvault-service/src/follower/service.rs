//! Follow, unfollow and list followers.

use std::sync::Arc;

use tracing::info;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::NodeId;
use docvault_database::{NodeStore, UnitOfWork};
use docvault_entity::follower::{FollowPreferences, Follower};
use docvault_entity::node::Node;

use crate::access::AccessGuard;
use crate::context::RequestContext;
use crate::tree::checks;

/// Manages follower records.
#[derive(Debug, Clone)]
pub struct FollowerService {
    /// Node store.
    store: Arc<dyn NodeStore>,
    /// Visibility checks.
    guard: AccessGuard,
}

impl FollowerService {
    /// Creates a new follower service.
    pub fn new(store: Arc<dyn NodeStore>, guard: AccessGuard) -> Self {
        Self { store, guard }
    }

    /// Subscribes the actor to a file, reactivating an earlier record.
    pub async fn follow(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        prefs: FollowPreferences,
    ) -> AppResult<Follower> {
        if prefs.days_before_alert < 0 {
            return Err(AppError::validation("days_before_alert cannot be negative"));
        }

        let mut uow = self.store.begin().await?;
        let node = self.visible_file(uow.as_mut(), ctx, node_id).await?;
        let follower = uow.upsert_follower(node.id, &ctx.actor, prefs).await?;
        uow.commit().await?;

        info!(node_id = %node_id, actor = %ctx.actor, "Node followed");
        Ok(follower)
    }

    /// Deactivates the actor's subscription.
    pub async fn unfollow(&self, ctx: &RequestContext, node_id: NodeId) -> AppResult<()> {
        let mut uow = self.store.begin().await?;
        if !uow.deactivate_follower(node_id, &ctx.actor).await? {
            return Err(AppError::not_found(format!(
                "{} does not follow node {node_id}",
                ctx.actor
            )));
        }
        uow.commit().await?;

        info!(node_id = %node_id, actor = %ctx.actor, "Node unfollowed");
        Ok(())
    }

    /// Active followers of a node the actor can see.
    pub async fn list_followers(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
    ) -> AppResult<Vec<Follower>> {
        let mut uow = self.store.begin().await?;
        let node = checks::find_active(uow.as_mut(), node_id).await?;
        if !self.guard.can_view(uow.as_mut(), &ctx.actor, &node).await? {
            return Err(AppError::not_found(format!("Node {node_id} not found")));
        }
        let followers = uow.followers_for_nodes(&[node_id], true).await?;
        uow.rollback().await?;
        Ok(followers)
    }

    async fn visible_file(
        &self,
        uow: &mut dyn UnitOfWork,
        ctx: &RequestContext,
        node_id: NodeId,
    ) -> AppResult<Node> {
        let node = checks::find_active(uow, node_id).await?;
        if !self.guard.can_view(uow, &ctx.actor, &node).await? {
            return Err(AppError::not_found(format!("Node {node_id} not found")));
        }
        if !node.kind.is_file() {
            return Err(AppError::validation("Only files can be followed"));
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Harness, ctx, grantee, owner, stranger};
    use crate::share::{GranteeRef, ShareRequest};
    use docvault_core::error::ErrorKind;

    #[tokio::test]
    async fn test_follow_unfollow_and_reactivate() {
        let h = Harness::new().await;
        let contract = h.file(owner(), None, "contract.pdf").await;
        h.services
            .shares
            .share(
                &ctx(owner()),
                contract.id,
                ShareRequest {
                    grantee: GranteeRef::Actor {
                        id: grantee().id,
                        kind: grantee().kind,
                    },
                    edit_allowed: false,
                },
            )
            .await
            .unwrap();

        let prefs = FollowPreferences {
            days_before_alert: 3,
            alert_on_expiry: false,
        };
        let first = h.services.followers.follow(&ctx(grantee()), contract.id, prefs).await.unwrap();
        assert_eq!(first.days_before_alert, 3);

        let listed = h.services.followers.list_followers(&ctx(owner()), contract.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_for(&grantee()));

        h.services.followers.unfollow(&ctx(grantee()), contract.id).await.unwrap();
        assert!(h.services.followers.list_followers(&ctx(owner()), contract.id).await.unwrap().is_empty());
        let err = h.services.followers.unfollow(&ctx(grantee()), contract.id).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        let again = h
            .services
            .followers
            .follow(&ctx(grantee()), contract.id, FollowPreferences::default())
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.days_before_alert, 7);
    }

    #[tokio::test]
    async fn test_follow_rejections() {
        let h = Harness::new().await;
        let docs = h.folder(owner(), None, "Docs").await;
        let contract = h.file(owner(), Some(docs.id), "contract.pdf").await;

        let err = h
            .services
            .followers
            .follow(&ctx(owner()), docs.id, FollowPreferences::default())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        let err = h
            .services
            .followers
            .follow(&ctx(stranger()), contract.id, FollowPreferences::default())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        let negative = FollowPreferences {
            days_before_alert: -1,
            alert_on_expiry: true,
        };
        let err = h
            .services
            .followers
            .follow(&ctx(owner()), contract.id, negative)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        let err = h
            .services
            .followers
            .list_followers(&ctx(stranger()), contract.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
