//! Seams between the coordinators and their collaborators.
//!
//! The remote corpus service, the confirmation prompt and the typesetting
//! pass are all external; these traits let each be swapped (HTTP vs. mock,
//! terminal vs. scripted answers) without touching coordinator logic.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

/// Remote corpus service contract.
#[async_trait]
pub trait CorpusApi: Send + Sync {
    /// List category names from the given endpoint.
    async fn list_categories(&self, source: CategorySource) -> Result<Vec<Category>>;

    /// Upload a batch of files into one category. Returns the server message.
    async fn upload(&self, category: &Category, files: &[UploadFile]) -> Result<String>;

    /// Ask a question, optionally scoped to one category.
    async fn ask(&self, request: &ChatRequest) -> Result<AnswerResult>;

    /// List document names stored under a category.
    async fn list_documents(&self, category: &Category) -> Result<Vec<String>>;

    /// Delete a whole category or one document in it. Returns the server message.
    async fn delete(&self, target: &DeletionTarget) -> Result<String>;

    /// Fetch the bytes behind a citation's download reference.
    async fn download(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Explicit user confirmation for irreversible actions.
pub trait ConfirmPrompt: Send + Sync {
    /// Returns true only if the user accepted.
    fn confirm(&self, message: &str) -> bool;
}

/// Optional post-render pass over answer text (e.g. math typesetting).
#[async_trait]
pub trait Typesetter: Send + Sync {
    /// Whether the pass can run in this environment.
    fn is_available(&self) -> bool {
        true
    }

    async fn typeset(&self, text: &str) -> Result<()>;
}
