//! Best-effort side effects of committed operations.

pub mod recorder;
pub mod sinks;
pub mod trail;

pub use recorder::{AuditRecorder, DeadlineRelay};
pub use sinks::{LoggingDeadlineNotifier, MemoryAuditLog};
pub use trail::AuditTrail;
