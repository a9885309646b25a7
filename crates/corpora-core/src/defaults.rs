//! Centralized default constants for the corpora client.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own literals.

// =============================================================================
// SERVICE
// =============================================================================

/// Default API root of the corpus service.
pub const API_ROOT: &str = "http://localhost:7071/api";

/// Default request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Delay before the directory refresh that follows a category deletion.
/// Gives the remote side time to settle.
pub const REFRESH_DELAY_MS: u64 = 1000;

/// Capacity of the directory change feed.
pub const FEED_CAPACITY: usize = 32;

// =============================================================================
// CATEGORIES
// =============================================================================

/// Reserved default category, always first in the upload selector.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Label shown for [`UNCATEGORIZED`].
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Sentinel option value meaning "create a new category".
pub const NEW_CATEGORY_OPTION: &str = "new_category_option";

/// Label shown for [`NEW_CATEGORY_OPTION`].
pub const NEW_CATEGORY_LABEL: &str = "+ Add New Category";

/// Label of the query selector's global-scope option (empty value).
pub const ALL_CATEGORIES_LABEL: &str = "All (Global Search)";

/// Placeholder label of the deletion category selectors (empty value).
pub const SELECT_CATEGORY_LABEL: &str = "-- Select Category --";

// =============================================================================
// DOCUMENTS
// =============================================================================

/// MIME type every uploaded file must declare.
pub const PDF_MIME: &str = "application/pdf";

/// Document selector placeholder while no category is selected.
pub const SELECT_CATEGORY_FIRST_LABEL: &str = "(Select Category First)";

/// Document selector placeholder while the document list is loading.
pub const LOADING_LABEL: &str = "(Loading...)";

/// Document selector placeholder once documents are listed.
pub const SELECT_DOCUMENT_LABEL: &str = "-- Select PDF --";

/// Disabled option shown when a category holds no documents.
pub const NO_DOCUMENTS_LABEL: &str = "No PDFs found";

/// Document selector placeholder after a failed document fetch.
pub const DOCUMENTS_ERROR_LABEL: &str = "Error loading PDFs";

// =============================================================================
// ANSWERS
// =============================================================================

/// Shown when the service returns no answer text.
pub const NO_ANSWER: &str = "No answer received.";

/// Shown when an answer carries neither citations nor source names.
pub const NO_SOURCES: &str = "No sources found.";

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Path of the client TOML configuration file.
pub const ENV_CONFIG: &str = "CORPORA_CONFIG";

/// Override for the API root.
pub const ENV_API_ROOT: &str = "CORPORA_API_ROOT";

/// Override for the request timeout (seconds).
pub const ENV_TIMEOUT_SECS: &str = "CORPORA_TIMEOUT_SECS";

/// Override for the category source (`catalog` or `deletion_index`).
pub const ENV_CATEGORY_SOURCE: &str = "CORPORA_CATEGORY_SOURCE";

/// Override for the post-deletion refresh delay (milliseconds).
pub const ENV_REFRESH_DELAY_MS: &str = "CORPORA_REFRESH_DELAY_MS";
