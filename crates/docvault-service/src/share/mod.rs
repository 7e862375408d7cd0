//! Share management and the share inheritance cascade.

pub mod service;

pub use service::{GranteeRef, ShareRequest, ShareService, ShareView};
