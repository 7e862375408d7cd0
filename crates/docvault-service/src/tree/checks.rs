//! Node preconditions shared by every mutating service.
//!
//! All of them read inside the caller's unit of work, so the answer holds
//! until that unit of work commits.

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::NodeId;
use docvault_database::UnitOfWork;
use docvault_database::store::MAX_TREE_DEPTH;
use docvault_entity::node::Node;

/// Lock an active node. Missing and trashed nodes are both `NotFound`.
pub(crate) async fn lock_active(uow: &mut dyn UnitOfWork, id: NodeId) -> AppResult<Node> {
    match uow.lock_node(id).await? {
        Some(node) if !node.is_trashed() => Ok(node),
        _ => Err(AppError::not_found(format!("Node {id} not found"))),
    }
}

/// Lock a trashed node. Missing and active nodes are both `NotFound`.
pub(crate) async fn lock_trashed(uow: &mut dyn UnitOfWork, id: NodeId) -> AppResult<Node> {
    match uow.lock_node(id).await? {
        Some(node) if node.is_trashed() => Ok(node),
        _ => Err(AppError::not_found(format!("Node {id} is not in the trash"))),
    }
}

/// Read an active node without locking it.
pub(crate) async fn find_active(uow: &mut dyn UnitOfWork, id: NodeId) -> AppResult<Node> {
    match uow.find_node(id).await? {
        Some(node) if !node.is_trashed() => Ok(node),
        _ => Err(AppError::not_found(format!("Node {id} not found"))),
    }
}

/// Lock `id` as a parent for new or moved children.
pub(crate) async fn lock_folder(uow: &mut dyn UnitOfWork, id: NodeId) -> AppResult<Node> {
    let folder = lock_active(uow, id).await?;
    if !folder.is_folder() {
        return Err(AppError::not_a_folder(format!("Node {id} is a file")));
    }
    Ok(folder)
}

/// Validate `target_id` as the new parent of `node` and return it locked.
///
/// The target's ancestor chain is re-read and share-locked here, inside the
/// unit of work that will write the new parent.
pub(crate) async fn check_move_target(
    uow: &mut dyn UnitOfWork,
    node: &Node,
    target_id: NodeId,
) -> AppResult<Node> {
    if target_id == node.id {
        return Err(AppError::invalid_target(format!(
            "Node {target_id} cannot be moved into itself"
        )));
    }
    let target = lock_folder(uow, target_id).await?;

    let ancestors = uow.lock_ancestors(target_id).await?;
    if ancestors.contains(&node.id) {
        return Err(AppError::cyclic_move(format!(
            "Node {target_id} is inside the subtree of node {}",
            node.id
        )));
    }
    if ancestors.len() >= MAX_TREE_DEPTH {
        return Err(AppError::internal(format!(
            "Parent chain of node {target_id} exceeds {MAX_TREE_DEPTH} levels"
        )));
    }
    Ok(target)
}
