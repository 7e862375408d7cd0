//! Follower entities.

pub mod model;

pub use model::{Follower, FollowPreferences, DEFAULT_DAYS_BEFORE_ALERT};
