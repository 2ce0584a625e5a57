//! Database query implementations.

pub mod contents;
pub mod edges;
pub mod layouts;
pub mod projects;
