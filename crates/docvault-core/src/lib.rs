//! # docvault-core
//!
//! Core crate for DocVault. Contains the boundary traits consumed by the
//! node engine (object store, capability lookup, actor directory, audit
//! sink, deadline notifier), configuration schemas, typed identifiers,
//! the listing query type, audit events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DocVault crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
