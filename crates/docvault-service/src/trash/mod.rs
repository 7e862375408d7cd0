//! Trash lifecycle: soft delete, restore, purge and retention.

pub(crate) mod purge;
pub mod service;

pub use service::{DeleteSummary, PurgeSummary, TrashEntry, TrashFilter, TrashService};
