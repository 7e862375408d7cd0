//! Node listing, read, create, update, move and delete handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use docvault_core::error::AppError;
use docvault_core::events::AuditEvent;
use docvault_core::types::NodeId;
use docvault_entity::node::{Node, NodePatch};
use docvault_service::NodeView;
use docvault_service::trash::DeleteSummary;

use crate::dto::request::{CreateNodeBody, MoveNodeBody};
use crate::dto::response::ApiResponse;
use crate::extractors::{ActingActor, ListParams};
use crate::state::AppState;

/// GET /api/nodes?parent_id=&status=&kind=&search=&limit=&offset=
pub async fn list_nodes(
    State(state): State<AppState>,
    actor: ActingActor,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<NodeView>>>, AppError> {
    let nodes = state
        .services
        .access
        .list(&actor, params.parent_id, &params.query())
        .await?;
    Ok(Json(ApiResponse::ok(nodes)))
}

/// GET /api/nodes/{id}
pub async fn get_node(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<NodeView>>, AppError> {
    let node = state.services.access.get_node(&actor, id).await?;
    Ok(Json(ApiResponse::ok(node)))
}

/// POST /api/nodes
pub async fn create_node(
    State(state): State<AppState>,
    actor: ActingActor,
    Json(body): Json<CreateNodeBody>,
) -> Result<(StatusCode, Json<ApiResponse<Node>>), AppError> {
    let node = state.services.tree.create(&actor, body.into_request()?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node))))
}

/// PATCH /api/nodes/{id}
pub async fn update_node(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
    Json(patch): Json<NodePatch>,
) -> Result<Json<ApiResponse<Node>>, AppError> {
    let node = state.services.tree.update(&actor, id, patch).await?;
    Ok(Json(ApiResponse::ok(node)))
}

/// PUT /api/nodes/{id}/move
pub async fn move_node(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
    Json(body): Json<MoveNodeBody>,
) -> Result<Json<ApiResponse<Node>>, AppError> {
    let node = state.services.tree.move_node(&actor, id, body.parent_id).await?;
    Ok(Json(ApiResponse::ok(node)))
}

/// DELETE /api/nodes/{id}
pub async fn delete_node(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<DeleteSummary>>, AppError> {
    let summary = state.services.trash.soft_delete(&actor, id).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/nodes/{id}/history?limit=&offset=
pub async fn history(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<AuditEvent>>>, AppError> {
    let events = state
        .services
        .history
        .history(&actor, id, &params.query())
        .await?;
    Ok(Json(ApiResponse::ok(events)))
}
