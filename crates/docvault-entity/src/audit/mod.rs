//! Audit log rows.

pub mod model;

pub use model::AuditLogEntry;
