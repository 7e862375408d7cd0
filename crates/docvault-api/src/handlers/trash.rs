//! Trash handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use docvault_core::error::AppError;
use docvault_core::types::NodeId;
use docvault_entity::node::Node;
use docvault_service::trash::{PurgeSummary, TrashEntry};

use crate::dto::request::{EmptyTrashParams, RestoreParams};
use crate::dto::response::ApiResponse;
use crate::extractors::{ActingActor, ListParams};
use crate::state::AppState;

/// GET /api/trash?parent_id=
pub async fn list_trash(
    State(state): State<AppState>,
    actor: ActingActor,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<TrashEntry>>>, AppError> {
    let entries = state
        .services
        .trash
        .list_trash(&actor, params.parent_id, &params.query())
        .await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// POST /api/trash/{id}/restore?parent_id=
pub async fn restore(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
    Query(params): Query<RestoreParams>,
) -> Result<Json<ApiResponse<Node>>, AppError> {
    let node = state.services.trash.restore(&actor, id, params.parent_id).await?;
    Ok(Json(ApiResponse::ok(node)))
}

/// DELETE /api/trash/{id}
pub async fn purge(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<PurgeSummary>>, AppError> {
    let summary = state.services.trash.purge(&actor, id).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// DELETE /api/trash?older_than_days=
pub async fn empty_trash(
    State(state): State<AppState>,
    actor: ActingActor,
    Query(params): Query<EmptyTrashParams>,
) -> Result<Json<ApiResponse<PurgeSummary>>, AppError> {
    let summary = state
        .services
        .trash
        .empty_trash(&actor, params.older_than_days)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}
