//! # docvault-storage
//!
//! Object store providers for DocVault file content. The local filesystem
//! provider is always available; the S3-compatible provider is behind the
//! `s3` feature.

pub mod manager;
pub mod providers;

pub use manager::build_object_store;
