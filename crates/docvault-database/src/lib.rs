//! # docvault-database
//!
//! PostgreSQL connection management, migrations, the [`NodeStore`] seam
//! with its Postgres and in-memory implementations, and the repositories
//! behind the capability, directory and audit boundaries.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{MemoryNodeStore, NodeFilter, NodeStore, PgNodeStore, UnitOfWork};
