//! HTTP-level integration tests over the in-memory store.

mod helpers;

mod follower_test;
mod node_test;
mod share_test;
mod trash_test;
mod tree_property_test;
mod upload_test;
