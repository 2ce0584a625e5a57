//! Route handlers.

pub mod content;
pub mod edges;
pub mod files;
pub mod images;
pub mod layout;
pub mod projects;
