//! Core type definitions used across the DocVault workspace.

pub mod actor;
pub mod id;
pub mod kind;
pub mod query;
pub mod response;

pub use actor::{Actor, ActorKind};
pub use id::*;
pub use kind::NodeKind;
pub use query::ListQuery;
pub use response::{ApiErrorResponse, ApiResponse};
