//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use docvault_core::error::AppError;
use docvault_core::types::{NodeId, NodeKind};
use docvault_service::tree::CreateNodeRequest;

/// `POST /api/nodes` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNodeBody {
    /// Parent folder; a top-level node when absent.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// `file` or `folder`.
    pub kind: NodeKind,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
    /// Status label.
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub status: Option<String>,
    /// Comments.
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub comments: Option<String>,
    /// Expiry date (files only).
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl CreateNodeBody {
    /// Validate the body and convert it into a service request.
    pub fn into_request(self) -> Result<CreateNodeRequest, AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid node: {e}")))?;
        let mut req = match self.kind {
            NodeKind::Folder => CreateNodeRequest::folder(self.parent_id, self.name),
            NodeKind::File => CreateNodeRequest::file(self.parent_id, self.name),
        };
        req.status = self.status;
        req.comments = self.comments;
        req.expires_on = self.expires_on;
        Ok(req)
    }
}

/// `PUT /api/nodes/{id}/move` body. A null `parent_id` moves to the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveNodeBody {
    /// New parent folder.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

/// `POST /api/trash/{id}/restore` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreParams {
    /// Restore into this folder instead of the original parent.
    pub parent_id: Option<NodeId>,
}

/// `DELETE /api/trash` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyTrashParams {
    /// Only purge nodes trashed more than this many days ago.
    pub older_than_days: Option<u32>,
}

/// `GET /api/shared-with-me` query, next to the listing parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedWithMeParams {
    /// Hide nodes whose parent is also shared with the caller.
    pub root_only: Option<bool>,
}
