//! Boundary traits defined in `docvault-core` and implemented by other crates.
//!
//! Each trait is a contract with a collaborator that lives outside the node
//! engine: blob storage, actor resolution, company membership, audit log,
//! and the deadline notifier.

pub mod audit;
pub mod capability;
pub mod directory;
pub mod notifier;
pub mod object_store;

pub use audit::AuditSink;
pub use capability::{Capabilities, Capability, CapabilityLookup, Membership};
pub use directory::ActorDirectory;
pub use notifier::DeadlineNotifier;
pub use object_store::{ObjectStore, StoredObject, extension_of};
