//! Content nodes: models and slug derivation.

pub mod model;
pub mod slug;

pub use model::{ContentNode, ContentPatch, NewContent, NodeOrigin, Position};
pub use slug::{slugify, unique_slug};
