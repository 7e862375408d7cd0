//! File content in the object store.

pub(crate) mod blobs;
pub mod service;

pub use service::{
    CompleteUploadRequest, ContentService, PresignRequest, PresignedUpload, UploadAttributes,
};
