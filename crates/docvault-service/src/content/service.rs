//! Upload, presigned upload and content replacement.
//!
//! Bytes go to the object store first; the node row only ever records the
//! resulting key. When the node write fails, the fresh blob is deleted
//! again on a best-effort basis.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use docvault_core::config::StorageConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::{ObjectStore, StoredObject, extension_of};
use docvault_core::types::NodeId;
use docvault_entity::node::{ContentUpdate, Node, NodePatch, validate_name};

use super::blobs;
use crate::context::RequestContext;
use crate::tree::{CreateNodeRequest, TreeService};

/// Node attributes supplied with an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadAttributes {
    /// Parent folder.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Node name (defaults to the file name).
    #[serde(default)]
    pub name: Option<String>,
    /// Status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Comments.
    #[serde(default)]
    pub comments: Option<String>,
    /// Expiry date.
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

/// Request for a presigned upload URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignRequest {
    /// Original file name.
    pub filename: String,
    /// MIME type the client will send.
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

/// A presigned upload target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    /// URL to `PUT` the bytes to.
    pub upload_url: String,
    /// Object key to pass to `complete_upload`.
    pub key: String,
    /// Public URL once uploaded.
    pub public_url: String,
    /// Lifetime of `upload_url`.
    pub expires_in_seconds: u64,
}

/// Request to create a file node from a presigned upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteUploadRequest {
    /// Key returned by `presign_upload`.
    pub key: String,
    /// Original file name.
    pub filename: String,
    /// Uploaded size in bytes.
    pub size_bytes: i64,
    /// Node attributes.
    #[serde(flatten)]
    pub attributes: UploadAttributes,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Handles file content.
#[derive(Debug, Clone)]
pub struct ContentService {
    /// Node creation and updates.
    tree: TreeService,
    /// Blob storage.
    objects: Arc<dyn ObjectStore>,
    /// Upload limits and presign lifetime.
    config: StorageConfig,
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(tree: TreeService, objects: Arc<dyn ObjectStore>, config: StorageConfig) -> Self {
        Self {
            tree,
            objects,
            config,
        }
    }

    /// Stores `data` and creates a file node for it.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        attributes: UploadAttributes,
        filename: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<Node> {
        self.check_size(data.len() as u64)?;
        let name = attributes.name.clone().unwrap_or_else(|| filename.to_string());
        validate_name(&name)?;

        let size_bytes = data.len() as i64;
        let key = StoredObject::generate_key(filename);
        let stored = self.objects.put(&key, data, content_type).await?;

        let req = file_request(
            attributes,
            name,
            ContentUpdate {
                content_ref: stored.key.clone(),
                size_bytes,
                extension: extension_of(filename),
            },
        );
        match self.tree.create(ctx, req).await {
            Ok(node) => {
                info!(node_id = %node.id, key = %stored.key, size_bytes, "File uploaded");
                Ok(node)
            }
            Err(e) => {
                blobs::release(self.objects.as_ref(), &[stored.key]).await;
                Err(e)
            }
        }
    }

    /// Reserves a key and returns a URL the client can upload to directly.
    pub async fn presign_upload(
        &self,
        ctx: &RequestContext,
        req: PresignRequest,
    ) -> AppResult<PresignedUpload> {
        validate_name(&req.filename)?;
        let key = StoredObject::generate_key(&req.filename);
        let ttl = Duration::from_secs(self.config.presign_ttl_seconds);
        let upload_url = self
            .objects
            .presign_put(&key, &req.content_type, ttl)
            .await?;

        info!(actor = %ctx.actor, key = %key, "Upload presigned");
        Ok(PresignedUpload {
            public_url: self.objects.public_url(&key),
            upload_url,
            key,
            expires_in_seconds: self.config.presign_ttl_seconds,
        })
    }

    /// Creates the file node for content uploaded through a presigned URL.
    pub async fn complete_upload(
        &self,
        ctx: &RequestContext,
        req: CompleteUploadRequest,
    ) -> AppResult<Node> {
        if req.key.trim().is_empty()
            || req.key.contains('/')
            || req.key.contains("..")
            || !blobs::is_owned_key(&req.key)
        {
            return Err(AppError::validation(format!("Invalid object key '{}'", req.key)));
        }
        if req.size_bytes < 0 {
            return Err(AppError::validation("Content size cannot be negative"));
        }
        self.check_size(req.size_bytes as u64)?;

        let name = req
            .attributes
            .name
            .clone()
            .unwrap_or_else(|| req.filename.clone());
        let content = ContentUpdate {
            content_ref: req.key,
            size_bytes: req.size_bytes,
            extension: extension_of(&req.filename),
        };
        self.tree
            .create(ctx, file_request(req.attributes, name, content))
            .await
    }

    /// Stores new bytes for a file and points the node at them.
    ///
    /// The previous blob is deleted after the update commits.
    pub async fn replace_content(
        &self,
        ctx: &RequestContext,
        node_id: NodeId,
        filename: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<Node> {
        self.check_size(data.len() as u64)?;

        let size_bytes = data.len() as i64;
        let key = StoredObject::generate_key(filename);
        let stored = self.objects.put(&key, data, content_type).await?;

        let patch = NodePatch::content(ContentUpdate {
            content_ref: stored.key.clone(),
            size_bytes,
            extension: extension_of(filename),
        });
        match self.tree.apply_patch(ctx, node_id, patch).await {
            Ok((node, outcome)) => {
                if let Some(previous) = outcome.replaced_content {
                    blobs::release(self.objects.as_ref(), &[previous]).await;
                }
                info!(node_id = %node_id, key = %stored.key, size_bytes, "Content replaced");
                Ok(node)
            }
            Err(e) => {
                blobs::release(self.objects.as_ref(), &[stored.key]).await;
                Err(e)
            }
        }
    }

    fn check_size(&self, size: u64) -> AppResult<()> {
        if size > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "Upload of {size} bytes exceeds the limit of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        Ok(())
    }
}

fn file_request(attributes: UploadAttributes, name: String, content: ContentUpdate) -> CreateNodeRequest {
    let mut req = CreateNodeRequest::file(attributes.parent_id, name);
    req.status = attributes.status;
    req.comments = attributes.comments;
    req.expires_on = attributes.expires_on;
    req.content = Some(content);
    req
}
