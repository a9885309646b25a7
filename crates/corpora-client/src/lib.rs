//! # corpora-client
//!
//! HTTP implementation of [`corpora_core::CorpusApi`] for the corpus service.
//!
//! This crate provides:
//! - [`HttpCorpusApi`], a `reqwest` client speaking the service's REST contract
//! - [`ClientConfig`], loaded from TOML with `CORPORA_*` environment overrides
//!
//! # Example
//!
//! ```rust,no_run
//! use corpora_client::{ClientConfig, HttpCorpusApi};
//! use corpora_core::{CategorySource, CorpusApi};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::load().expect("Failed to load config");
//!     let api = HttpCorpusApi::new(config).expect("Failed to build client");
//!     let categories = api.list_categories(CategorySource::Catalog).await.unwrap();
//! }
//! ```

pub mod config;
pub mod http;
pub mod types;

pub use config::{ClientConfig, ConfigError, ConfigResult};
pub use http::HttpCorpusApi;
