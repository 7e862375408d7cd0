//! Trash retention configuration.

use serde::{Deserialize, Serialize};

/// Trash retention and scheduled sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashConfig {
    /// Trashed nodes older than this many days are purged by the sweep.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Whether the scheduled sweep runs.
    #[serde(default = "default_true")]
    pub sweep_enabled: bool,
    /// Cron expression (with seconds) for the sweep.
    #[serde(default = "default_sweep_cron")]
    pub sweep_cron: String,
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            sweep_enabled: default_true(),
            sweep_cron: default_sweep_cron(),
        }
    }
}

fn default_retention_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn default_sweep_cron() -> String {
    "0 0 3 * * *".to_string()
}
