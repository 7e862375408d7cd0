//! Share graph entities.

pub mod model;

pub use model::{Share, ShareGrant};
