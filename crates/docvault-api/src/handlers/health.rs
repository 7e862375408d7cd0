//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let store = state.store.health_check().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Node store health check failed");
        false
    });
    let object_store = state.objects.health_check().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Object store health check failed");
        false
    });

    Json(ApiResponse::ok(HealthResponse {
        status: if store && object_store { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
        object_store,
    }))
}
