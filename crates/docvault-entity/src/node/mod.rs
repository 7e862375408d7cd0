//! Node domain entities.

pub mod model;
pub mod patch;
pub mod tree;

pub use model::{DeletionStamp, NewNode, Node, DEFAULT_STATUS};
pub use patch::{ContentUpdate, FieldChange, NodePatch, PatchOutcome, validate_name};
pub use tree::{SubtreeIndex, TreeLink};
