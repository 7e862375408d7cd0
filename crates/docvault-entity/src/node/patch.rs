//! Partial updates of node attributes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use docvault_core::error::AppError;
use docvault_core::events::NodeAction;
use docvault_core::result::AppResult;
use docvault_core::types::Actor;

use super::model::Node;

/// Maximum length of a node name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// New content metadata after a re-upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUpdate {
    /// Object store key or URL.
    pub content_ref: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Lower-cased extension with the dot.
    pub extension: Option<String>,
}

/// A partial update. `None` leaves a field untouched; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New status label.
    #[serde(default)]
    pub status: Option<String>,
    /// New comments.
    #[serde(default, deserialize_with = "double_option")]
    pub comments: Option<Option<String>>,
    /// New expiry date (files only).
    #[serde(default, deserialize_with = "double_option")]
    pub expires_on: Option<Option<NaiveDate>>,
    /// New owner.
    #[serde(default)]
    pub owner: Option<Actor>,
    /// Replaced content.
    #[serde(skip)]
    pub content: Option<ContentUpdate>,
}

impl NodePatch {
    /// A patch that only renames.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A patch that only replaces content.
    pub fn content(update: ContentUpdate) -> Self {
        Self {
            content: Some(update),
            ..Default::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.comments.is_none()
            && self.expires_on.is_none()
            && self.owner.is_none()
            && self.content.is_none()
    }

    /// Whether the patch transfers ownership.
    pub fn transfers_ownership(&self) -> bool {
        self.owner.is_some()
    }

    /// Reject malformed values before anything is written.
    pub fn validate(&self, node: &Node) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(status) = &self.status {
            if status.trim().is_empty() {
                return Err(AppError::validation("Status cannot be empty"));
            }
        }
        if !node.kind.is_file() {
            if matches!(self.expires_on, Some(Some(_))) {
                return Err(AppError::validation("Only files carry an expiry date"));
            }
            if self.content.is_some() {
                return Err(AppError::validation("Only files carry content"));
            }
        }
        if let Some(content) = &self.content {
            if content.size_bytes < 0 {
                return Err(AppError::validation("Content size cannot be negative"));
            }
        }
        Ok(())
    }

    /// Apply the patch to `node` in place, recording what actually changed.
    pub fn apply(self, node: &mut Node, now: DateTime<Utc>) -> PatchOutcome {
        let mut changes = Vec::new();

        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name != node.name {
                changes.push(FieldChange::new("name", json!(node.name), json!(name)));
                node.name = name;
            }
        }
        if let Some(status) = self.status {
            if status != node.status {
                changes.push(FieldChange::new("status", json!(node.status), json!(status)));
                node.status = status;
            }
        }
        if let Some(comments) = self.comments {
            if comments != node.comments {
                changes.push(FieldChange::new("comments", json!(node.comments), json!(comments)));
                node.comments = comments;
            }
        }
        if let Some(expires_on) = self.expires_on {
            if expires_on != node.expires_on {
                changes.push(FieldChange::new(
                    "expires_on",
                    json!(node.expires_on),
                    json!(expires_on),
                ));
                node.expires_on = expires_on;
            }
        }
        if let Some(owner) = self.owner {
            if !node.is_owned_by(&owner) {
                changes.push(FieldChange::new("owner", json!(node.owner()), json!(owner)));
                node.owner_id = owner.id;
                node.owner_kind = owner.kind;
            }
        }
        let mut replaced_content = None;
        if let Some(content) = self.content {
            changes.push(FieldChange::new(
                "content_ref",
                json!(node.content_ref),
                json!(content.content_ref),
            ));
            replaced_content = node.content_ref.replace(content.content_ref);
            node.size_bytes = Some(content.size_bytes);
            node.extension = content.extension;
        }

        if !changes.is_empty() {
            node.updated_at = now;
        }

        PatchOutcome {
            changes,
            replaced_content,
        }
    }
}

/// Trim a proposed name and reject empty or oversized values.
pub fn validate_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    if trimmed.contains('/') || trimmed.contains('\0') {
        return Err(AppError::validation("Name contains invalid characters"));
    }
    Ok(())
}

/// A single attribute change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// Attribute name.
    pub field: &'static str,
    /// Value before.
    pub from: Value,
    /// Value after.
    pub to: Value,
}

impl FieldChange {
    fn new(field: &'static str, from: Value, to: Value) -> Self {
        Self { field, from, to }
    }
}

/// Result of applying a [`NodePatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchOutcome {
    /// Attributes that changed.
    pub changes: Vec<FieldChange>,
    /// Previous content reference, when the content was replaced.
    pub replaced_content: Option<String>,
}

impl PatchOutcome {
    /// Whether anything changed.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether `field` changed.
    pub fn changed(&self, field: &str) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }

    /// Audit action for this change set: re-upload wins over rename, rename over edit.
    pub fn action(&self) -> Option<NodeAction> {
        if self.is_noop() {
            None
        } else if self.changed("content_ref") {
            Some(NodeAction::VersionUploaded)
        } else if self.changed("name") {
            Some(NodeAction::Renamed)
        } else {
            Some(NodeAction::Edited)
        }
    }

    /// Change set as audit details.
    pub fn details(&self) -> Value {
        let fields: serde_json::Map<String, Value> = self
            .changes
            .iter()
            .map(|c| (c.field.to_string(), json!({ "from": c.from, "to": c.to })))
            .collect();
        json!({ "changes": fields })
    }
}
