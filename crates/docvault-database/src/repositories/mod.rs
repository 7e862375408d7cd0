//! Repositories for the tables the engine reads or appends to outside a unit of work.

pub mod audit;
pub mod capability;
pub mod directory;

pub use audit::AuditLogRepository;
pub use capability::CapabilityRepository;
pub use directory::ActorRepository;
