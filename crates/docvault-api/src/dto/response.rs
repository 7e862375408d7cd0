//! Response DTOs.

use serde::{Deserialize, Serialize};

pub use docvault_core::types::ApiResponse;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Node store reachable.
    pub store: bool,
    /// Object store reachable.
    pub object_store: bool,
}

/// Result of an unshare.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnshareResponse {
    /// Edges removed across the subtree.
    pub removed: u64,
}
