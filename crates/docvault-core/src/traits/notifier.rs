//! Deadline notifier.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::result::AppResult;
use crate::types::NodeId;

/// External consumer of file expiry dates.
///
/// The engine reports every change of `expires_on`; deciding whom to notify
/// and when is the notifier's business.
#[async_trait]
pub trait DeadlineNotifier: Send + Sync + std::fmt::Debug + 'static {
    /// The expiry date of `node_id` is now `expires_on` (`None` clears it).
    async fn expiry_changed(&self, node_id: NodeId, expires_on: Option<NaiveDate>) -> AppResult<()>;

    /// The nodes were purged and must no longer be tracked.
    async fn nodes_removed(&self, node_ids: &[NodeId]) -> AppResult<()>;
}
