//! # docvault-auth
//!
//! Authorization for the DocVault node engine. Authentication happens
//! upstream; this crate only answers what an already identified actor may
//! do.
//!
//! ## Modules
//!
//! - `capability`: company capability resolution with a moka cache in front of the lookup
//! - `policy`: the single `can_mutate` predicate and the visibility rule
//! - `directory`: in-process actor directory for development and tests

pub mod capability;
pub mod directory;
pub mod policy;

pub use capability::{CachedCapabilityLookup, CapabilityResolver, StaticCapabilityLookup};
pub use directory::StaticActorDirectory;
pub use policy::{AccessFacts, MutationPolicy, Operation};
