//! Follow, unfollow and follower listing handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use bytes::Bytes;

use docvault_core::error::AppError;
use docvault_core::types::NodeId;
use docvault_entity::follower::{FollowPreferences, Follower};

use crate::dto::response::ApiResponse;
use crate::extractors::ActingActor;
use crate::state::AppState;

/// POST /api/nodes/{id}/follow
///
/// The body is optional; missing preferences take their defaults.
pub async fn follow(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
    body: Bytes,
) -> Result<Json<ApiResponse<Follower>>, AppError> {
    let prefs = if body.iter().all(u8::is_ascii_whitespace) {
        FollowPreferences::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid follow preferences: {e}")))?
    };
    let follower = state.services.followers.follow(&actor, id, prefs).await?;
    Ok(Json(ApiResponse::ok(follower)))
}

/// DELETE /api/nodes/{id}/follow
pub async fn unfollow(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
) -> Result<StatusCode, AppError> {
    state.services.followers.unfollow(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/nodes/{id}/followers
pub async fn list_followers(
    State(state): State<AppState>,
    actor: ActingActor,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<Vec<Follower>>>, AppError> {
    let followers = state.services.followers.list_followers(&actor, id).await?;
    Ok(Json(ApiResponse::ok(followers)))
}
