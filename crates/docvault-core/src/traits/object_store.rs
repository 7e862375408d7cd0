//! Object store trait for opaque file content.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;

/// Location of a stored object, as kept in a node's `content_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Provider-relative object key.
    pub key: String,
    /// Public URL for the object.
    pub url: String,
}

impl StoredObject {
    /// Generate a fresh object key that keeps the original file extension.
    ///
    /// `report.PDF` becomes `"<uuid>.pdf"`; names without an extension get a bare uuid.
    pub fn generate_key(filename: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        match extension_of(filename) {
            Some(ext) => format!("{id}{ext}"),
            None => id,
        }
    }
}

/// Lower-cased extension of a filename including the leading dot.
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(pos) if pos + 1 < name.len() => Some(name[pos..].to_lowercase()),
        Some(_) => None,
    }
}

/// Trait for blob storage backends.
///
/// The engine never reads content back; it only stores the returned key
/// and URL on the node.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. `"local"`, `"s3"`).
    fn provider_type(&self) -> &str;

    /// Check whether the provider is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store `data` under `key` and return its location.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredObject>;

    /// Delete the object stored under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Produce a URL a client can `PUT` the content to directly.
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration) -> AppResult<String>;

    /// Public URL for a key.
    fn public_url(&self, key: &str) -> String;
}
