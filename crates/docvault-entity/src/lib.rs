//! # docvault-entity
//!
//! Domain entity models for DocVault. Every struct in this crate is either
//! a database row (deriving `sqlx::FromRow`) or a value object that
//! describes a change to one. The [`node::tree`] module holds the in-memory
//! adjacency index used by every cascading operation.

pub mod audit;
pub mod follower;
pub mod node;
pub mod share;

pub use docvault_core::types::NodeKind;
