//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use docvault_core::config::AppConfig;
use docvault_core::traits::ObjectStore;
use docvault_database::NodeStore;
use docvault_service::Services;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Node store, for health checks
    pub store: Arc<dyn NodeStore>,
    /// Object store, for health checks
    pub objects: Arc<dyn ObjectStore>,
    /// Node engine services
    pub services: Services,
}

impl AppState {
    /// Bundle the state for the router.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn NodeStore>,
        objects: Arc<dyn ObjectStore>,
        services: Services,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            objects,
            services,
        }
    }
}
