//! Custom Axum extractors.

pub mod actor;
pub mod listing;

pub use actor::ActingActor;
pub use listing::ListParams;
