//! # corpora-core
//!
//! Core types, traits, and abstractions for the corpora document client.
//!
//! This crate provides the data model shared by the HTTP client and the
//! coordinators (categories, uploads, citations, deletion requests), the
//! workspace error type, and the [`CorpusApi`] seam behind which the remote
//! corpus service lives.

pub mod defaults;
pub mod error;
pub mod events;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{DirectoryFeed, DirectorySnapshot};
pub use models::*;
pub use traits::*;
