//! Expiry-alert subscriptions on files.

pub mod service;

pub use service::FollowerService;
