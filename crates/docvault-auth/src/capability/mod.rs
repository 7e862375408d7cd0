//! Company capability resolution.

pub mod cached;
pub mod resolver;
pub mod static_table;

pub use cached::CachedCapabilityLookup;
pub use resolver::CapabilityResolver;
pub use static_table::StaticCapabilityLookup;
