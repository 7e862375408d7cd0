//! Mutation and visibility policy.

pub mod enforcer;
pub mod operation;

pub use enforcer::{AccessFacts, MutationPolicy};
pub use operation::Operation;
