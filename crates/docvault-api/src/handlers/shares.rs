//! Share edge handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use docvault_core::error::AppError;
use docvault_core::types::{Actor, ActorId, ActorKind, NodeId};
use docvault_entity::share::Share;
use docvault_service::NodeView;
use docvault_service::share::{ShareRequest, ShareView};

use crate::dto::request::SharedWithMeParams;
use crate::dto::response::{ApiResponse, UnshareResponse};
use crate::extractors::{ActingActor, ListParams};
use crate::state::AppState;

/// GET /api/nodes/{id}/shares
pub async fn list_shares(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<Vec<ShareView>>>, AppError> {
    let shares = state.services.shares.list_node_shares(&actor, id).await?;
    Ok(Json(ApiResponse::ok(shares)))
}

/// POST /api/nodes/{id}/shares
pub async fn share_node(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
    Json(req): Json<ShareRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Share>>), AppError> {
    let share = state.services.shares.share(&actor, id, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(share))))
}

/// DELETE /api/nodes/{id}/shares/{grantee_kind}/{grantee_id}
pub async fn unshare_node(
    State(state): State<AppState>,
    actor: ActingActor,
    Path((id, grantee_kind, grantee_id)): Path<(NodeId, String, ActorId)>,
) -> Result<Json<ApiResponse<UnshareResponse>>, AppError> {
    let kind: ActorKind = grantee_kind.parse()?;
    let removed = state
        .services
        .shares
        .unshare(&actor, id, Actor::new(grantee_id, kind))
        .await?;
    Ok(Json(ApiResponse::ok(UnshareResponse { removed })))
}

/// GET /api/shared-with-me?root_only=
pub async fn shared_with_me(
    State(state): State<AppState>,
    actor: ActingActor,
    Query(list): Query<ListParams>,
    Query(params): Query<SharedWithMeParams>,
) -> Result<Json<ApiResponse<Vec<NodeView>>>, AppError> {
    let nodes = state
        .services
        .shares
        .shared_with_me(&actor, params.root_only.unwrap_or(false), &list.query())
        .await?;
    Ok(Json(ApiResponse::ok(nodes)))
}
