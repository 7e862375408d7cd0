//! Audit events emitted by mutating node operations.
//!
//! One event is emitted per logical operation, after its unit of work has
//! committed. Delivery goes through an [`AuditSink`](crate::traits::AuditSink)
//! and is best-effort.

pub mod node;

pub use node::{AuditEvent, NodeAction};
