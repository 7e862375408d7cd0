//! Route definitions for the DocVault HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(node_routes())
        .merge(share_routes())
        .merge(follower_routes())
        .merge(trash_routes())
        .merge(upload_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(middleware::compression::build_compression_layer())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Node CRUD and move
fn node_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/nodes",
            get(handlers::nodes::list_nodes).post(handlers::nodes::create_node),
        )
        .route(
            "/nodes/{id}",
            get(handlers::nodes::get_node)
                .patch(handlers::nodes::update_node)
                .delete(handlers::nodes::delete_node),
        )
        .route("/nodes/{id}/move", put(handlers::nodes::move_node))
        .route("/nodes/{id}/history", get(handlers::nodes::history))
        .route("/nodes/{id}/content", put(handlers::uploads::replace_content))
}

/// Share edges
fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/nodes/{id}/shares",
            get(handlers::shares::list_shares).post(handlers::shares::share_node),
        )
        .route(
            "/nodes/{id}/shares/{grantee_kind}/{grantee_id}",
            delete(handlers::shares::unshare_node),
        )
        .route("/shared-with-me", get(handlers::shares::shared_with_me))
}

fn follower_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/nodes/{id}/follow",
            post(handlers::followers::follow).delete(handlers::followers::unfollow),
        )
        .route("/nodes/{id}/followers", get(handlers::followers::list_followers))
}

/// Trash listing, restore and purge
fn trash_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/trash",
            get(handlers::trash::list_trash).delete(handlers::trash::empty_trash),
        )
        .route("/trash/{id}", delete(handlers::trash::purge))
        .route("/trash/{id}/restore", post(handlers::trash::restore))
}

/// Direct and presigned uploads
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/uploads", post(handlers::uploads::upload))
        .route("/uploads/presign", post(handlers::uploads::presign))
        .route("/uploads/complete", post(handlers::uploads::complete))
}
