//! # docvault-service
//!
//! The node engine. Each service orchestrates the node store, the
//! authorization policy, the object store and the audit sink to implement
//! one group of operations on the node hierarchy.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time, and [`Services::build`] wires them together.
//! Every mutating operation runs as one unit of work against the store.

pub mod access;
pub mod audit;
pub mod backend;
pub mod content;
pub mod context;
pub mod follower;
pub mod services;
pub mod share;
pub mod trash;
pub mod tree;

#[cfg(test)]
mod fixtures;

pub use access::{AccessGuard, AccessResolver, Enricher, NodeView};
pub use audit::{AuditRecorder, AuditTrail, DeadlineRelay, LoggingDeadlineNotifier, MemoryAuditLog};
pub use backend::Backend;
pub use content::ContentService;
pub use context::RequestContext;
pub use follower::FollowerService;
pub use services::{ServiceDeps, Services};
pub use share::ShareService;
pub use trash::TrashService;
pub use tree::TreeService;
