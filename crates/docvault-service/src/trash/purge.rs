//! The recursive purge routine shared by `purge` and `empty_trash`.

use tracing::debug;

use docvault_core::result::AppResult;
use docvault_core::types::NodeId;
use docvault_database::{NodeFilter, UnitOfWork};

/// What one purge removed.
#[derive(Debug, Clone, Default)]
pub(crate) struct PurgedSubtree {
    /// Removed node ids, children before parents.
    pub ids: Vec<NodeId>,
    /// Content references of removed files.
    pub blobs: Vec<String>,
}

/// Remove `root` and everything below it: share edges and follower records
/// first, then the node rows in post-order.
pub(crate) async fn purge_subtree(
    uow: &mut dyn UnitOfWork,
    root: NodeId,
) -> AppResult<PurgedSubtree> {
    let index = uow.lock_subtree(root).await?;
    let ids = index.postorder();

    let blobs = uow
        .find_nodes(&NodeFilter::by_ids(ids.clone()))
        .await?
        .into_iter()
        .filter(|n| n.kind.is_file())
        .filter_map(|n| n.content_ref)
        .collect();

    let shares = uow.delete_shares_for_nodes(&ids).await?;
    let followers = uow.delete_followers_for_nodes(&ids).await?;
    let nodes = uow.delete_nodes(&ids).await?;
    debug!(root = %root, nodes, shares, followers, "Subtree purged");

    Ok(PurgedSubtree { ids, blobs })
}
