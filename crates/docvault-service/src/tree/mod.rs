//! Tree operations: create, move and update.

pub(crate) mod checks;
pub mod service;

pub use service::{CreateNodeRequest, TreeService};
