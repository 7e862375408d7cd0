//! Built-in job handler implementations.

pub mod trash;

pub use trash::TrashRetentionHandler;
