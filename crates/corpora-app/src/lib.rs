//! # corpora-app
//!
//! Coordinators that keep the upload, query and deletion workflows consistent
//! with the server-held set of categories and documents.
//!
//! - [`CategoryDirectory`] owns the category snapshot and re-renders every
//!   registered selector after each refresh
//! - [`UploadCoordinator`], [`QueryCoordinator`] and [`DeletionCoordinator`]
//!   each drive one workflow and report through their own [`StatusReporter`]
//! - [`ResultAggregator`] turns an answer payload into a deduplicated listing
//! - [`Session`] wires all of the above around one [`corpora_core::CorpusApi`]

pub mod aggregator;
pub mod deletion;
pub mod directory;
pub mod files;
pub mod query;
pub mod selector;
pub mod session;
pub mod status;
pub mod upload;

#[cfg(test)]
pub mod mock;

pub use aggregator::{RenderedAnswer, ResultAggregator, SourceListing, SourceRow};
pub use deletion::{DeletionCoordinator, DeletionOutcome};
pub use directory::{CategoryDirectory, ViewPolicy};
pub use query::QueryCoordinator;
pub use selector::{SelectOption, Selector, SharedSelector};
pub use session::Session;
pub use status::{Status, StatusKind, StatusReporter};
pub use upload::UploadCoordinator;
