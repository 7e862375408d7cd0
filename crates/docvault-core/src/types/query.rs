//! Listing filters shared by every node listing.

use serde::{Deserialize, Serialize};

use crate::types::kind::NodeKind;

/// Default number of nodes returned by a listing.
pub const DEFAULT_LIST_LIMIT: u32 = 200;
/// Upper bound for `limit`.
pub const MAX_LIST_LIMIT: u32 = 1000;
/// Status value that disables status filtering.
pub const ALL_STATUSES: &str = "all";

/// Every filter a node listing recognizes.
///
/// | field         | default | meaning                                            |
/// |---------------|---------|----------------------------------------------------|
/// | `status`      | none    | exact status label; `"all"` disables the filter    |
/// | `kind`        | none    | restrict to files or folders                       |
/// | `search_text` | none    | case-insensitive substring of name or comments     |
/// | `limit`       | 200     | clamped to `1..=1000`                              |
/// | `offset`      | 0       | rows skipped after ordering                        |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Status label filter.
    pub status: Option<String>,
    /// Kind filter.
    pub kind: Option<NodeKind>,
    /// Free-text search over name and comments.
    #[serde(alias = "search")]
    pub search_text: Option<String>,
    /// Maximum number of rows.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: None,
            kind: None,
            search_text: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

impl ListQuery {
    /// Status filter to apply, if any.
    pub fn status_filter(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_STATUSES))
    }

    /// Trimmed search text, if any.
    pub fn search(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Limit clamped to the accepted range.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIST_LIMIT) as usize
    }

    /// Offset as a `usize`.
    pub fn effective_offset(&self) -> usize {
        self.offset as usize
    }

    /// Whether a node with these attributes passes the status, kind, and search filters.
    pub fn accepts(&self, kind: NodeKind, status: &str, name: &str, comments: Option<&str>) -> bool {
        if let Some(wanted) = self.kind {
            if wanted != kind {
                return false;
            }
        }
        if let Some(wanted) = self.status_filter() {
            if wanted != status {
                return false;
            }
        }
        if let Some(needle) = self.search() {
            let needle = needle.to_lowercase();
            let in_name = name.to_lowercase().contains(&needle);
            let in_comments = comments
                .map(|c| c.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_comments {
                return false;
            }
        }
        true
    }

    /// Apply offset and limit to an already ordered list.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.effective_offset())
            .take(self.effective_limit())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_status_disables_filter() {
        let query = ListQuery {
            status: Some("All".to_string()),
            ..Default::default()
        };
        assert_eq!(query.status_filter(), None);
        assert!(query.accepts(NodeKind::File, "expired", "a.pdf", None));
    }

    #[test]
    fn test_search_matches_name_or_comments() {
        let query = ListQuery {
            search_text: Some("  Contract ".to_string()),
            ..Default::default()
        };
        assert!(query.accepts(NodeKind::File, "valid", "contract.pdf", None));
        assert!(query.accepts(NodeKind::File, "valid", "x.pdf", Some("signed CONTRACT")));
        assert!(!query.accepts(NodeKind::File, "valid", "x.pdf", Some("invoice")));
    }

    #[test]
    fn test_kind_and_status_filters() {
        let query = ListQuery {
            status: Some("valid".to_string()),
            kind: Some(NodeKind::Folder),
            ..Default::default()
        };
        assert!(query.accepts(NodeKind::Folder, "valid", "Docs", None));
        assert!(!query.accepts(NodeKind::File, "valid", "Docs", None));
        assert!(!query.accepts(NodeKind::Folder, "pending", "Docs", None));
    }

    #[test]
    fn test_limit_is_clamped() {
        let query = ListQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), 1);
        let query = ListQuery {
            limit: 50_000,
            offset: 2,
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), MAX_LIST_LIMIT as usize);
        assert_eq!(query.paginate(vec![1, 2, 3, 4]), vec![3, 4]);
    }
}
