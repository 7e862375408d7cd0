//! Read-side access: authorization facts, visibility resolution and enrichment.

pub mod enrich;
pub mod guard;
pub mod resolver;

pub use enrich::{Enricher, NodeView};
pub use guard::{AccessGuard, NodeAccess};
pub use resolver::AccessResolver;
