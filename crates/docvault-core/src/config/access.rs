//! Access resolver configuration.

use serde::{Deserialize, Serialize};

/// Capability lookup caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Seconds a resolved membership stays cached.
    #[serde(default = "default_capability_ttl")]
    pub capability_cache_ttl_seconds: u64,
    /// Maximum number of cached memberships.
    #[serde(default = "default_capability_capacity")]
    pub capability_cache_capacity: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            capability_cache_ttl_seconds: default_capability_ttl(),
            capability_cache_capacity: default_capability_capacity(),
        }
    }
}

fn default_capability_ttl() -> u64 {
    60
}

fn default_capability_capacity() -> u64 {
    10_000
}
