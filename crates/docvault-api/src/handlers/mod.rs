//! HTTP handlers, one module per resource.

pub mod followers;
pub mod health;
pub mod nodes;
pub mod shares;
pub mod trash;
pub mod uploads;
