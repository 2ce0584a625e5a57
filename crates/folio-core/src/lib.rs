//! Folio Core Library
//!
//! Domain models and services for the portfolio content graph: content nodes
//! and edges over pluggable stores, task files, projects, layouts, image
//! storage, and the debounced canvas sync engine.

pub mod auth;
pub mod canvas;
pub mod content;
pub mod error;
pub mod files;
pub mod graph;
pub mod layout;
pub mod media;
pub mod project;

pub use error::{FolioError, FolioResult};
