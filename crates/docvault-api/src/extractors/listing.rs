//! Listing query parameters.

use serde::{Deserialize, Serialize};

use docvault_core::types::{ListQuery, NodeId, NodeKind};
use docvault_core::types::query::DEFAULT_LIST_LIMIT;

/// Query parameters accepted by node listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    /// Folder to list; the root set when absent.
    pub parent_id: Option<NodeId>,
    /// Status label, or `all`.
    pub status: Option<String>,
    /// `file` or `folder`.
    pub kind: Option<NodeKind>,
    /// Free-text search.
    pub search: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

impl ListParams {
    /// The listing filters carried by these parameters.
    pub fn query(&self) -> ListQuery {
        ListQuery {
            status: self.status.clone(),
            kind: self.kind,
            search_text: self.search.clone(),
            limit: self.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            offset: self.offset.unwrap_or(0),
        }
    }
}
