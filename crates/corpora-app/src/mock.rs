//! In-memory corpus service used by the coordinator tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use corpora_core::{
    AnswerResult, Category, CategorySource, ChatRequest, ConfirmPrompt, CorpusApi,
    DeletionTarget, Error, Result, UploadFile,
};

/// One recorded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCategories(CategorySource),
    Upload { category: Category, files: Vec<String> },
    Ask(ChatRequest),
    ListDocuments(Category),
    Delete(DeletionTarget),
    Download(String),
}

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    documents: HashMap<String, Vec<String>>,
    answer: AnswerResult,
    calls: Vec<Call>,
    listing_failure: Option<(u16, String)>,
    documents_failure: Option<(u16, String)>,
    upload_failure: Option<(u16, String)>,
    ask_failure: Option<(u16, String)>,
    delete_failure: Option<(u16, String)>,
    frozen_categories: bool,
}

/// Records every call and answers from in-memory state.
///
/// Uploads create their category and category deletions remove it, so
/// directory refreshes observe the side effects of earlier calls.
#[derive(Default)]
pub struct MockCorpusApi {
    state: Mutex<State>,
    ask_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockCorpusApi {
    pub fn with_categories(names: &[&str]) -> Self {
        let api = Self::default();
        api.set_categories(names);
        api
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_categories(&self, names: &[&str]) {
        self.state().categories = names.iter().map(|n| Category::new(*n)).collect();
    }

    pub fn set_documents(&self, category: &str, documents: &[&str]) {
        self.state().documents.insert(
            category.to_string(),
            documents.iter().map(|d| d.to_string()).collect(),
        );
    }

    pub fn set_answer(&self, answer: AnswerResult) {
        self.state().answer = answer;
    }

    pub fn fail_listing(&self, status: u16, body: &str) {
        self.state().listing_failure = Some((status, body.to_string()));
    }

    pub fn fail_documents(&self, status: u16, body: &str) {
        self.state().documents_failure = Some((status, body.to_string()));
    }

    pub fn fail_upload(&self, status: u16, body: &str) {
        self.state().upload_failure = Some((status, body.to_string()));
    }

    /// `body` is parsed as a JSON error envelope.
    pub fn fail_ask(&self, status: u16, body: &str) {
        self.state().ask_failure = Some((status, body.to_string()));
    }

    pub fn fail_delete(&self, status: u16, body: &str) {
        self.state().delete_failure = Some((status, body.to_string()));
    }

    /// Uploads and wipes stop changing the category listing.
    pub fn freeze_categories(&self) {
        self.state().frozen_categories = true;
    }

    /// Hold every `ask` until the returned handle is notified.
    pub fn gate_ask(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.ask_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls excluding category listings.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ListCategories(_) | Call::ListDocuments(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl CorpusApi for MockCorpusApi {
    async fn list_categories(&self, source: CategorySource) -> Result<Vec<Category>> {
        self.record(Call::ListCategories(source));
        let state = self.state();
        if let Some((status, body)) = &state.listing_failure {
            return Err(Error::from_text_body(*status, body));
        }
        Ok(state.categories.clone())
    }

    async fn upload(&self, category: &Category, files: &[UploadFile]) -> Result<String> {
        self.record(Call::Upload {
            category: category.clone(),
            files: files.iter().map(|f| f.filename.clone()).collect(),
        });
        let mut state = self.state();
        if let Some((status, body)) = &state.upload_failure {
            return Err(Error::from_text_body(*status, body));
        }
        if !state.frozen_categories && !state.categories.contains(category) {
            state.categories.push(category.clone());
        }
        state
            .documents
            .entry(category.to_string())
            .or_default()
            .extend(files.iter().map(|f| f.filename.clone()));
        Ok(format!("Uploaded {} file(s) to '{}'", files.len(), category))
    }

    async fn ask(&self, request: &ChatRequest) -> Result<AnswerResult> {
        self.record(Call::Ask(request.clone()));
        let gate = self.ask_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let state = self.state();
        if let Some((status, body)) = &state.ask_failure {
            return Err(Error::from_json_body(*status, body));
        }
        Ok(state.answer.clone())
    }

    async fn list_documents(&self, category: &Category) -> Result<Vec<String>> {
        self.record(Call::ListDocuments(category.clone()));
        let state = self.state();
        if let Some((status, body)) = &state.documents_failure {
            return Err(Error::from_text_body(*status, body));
        }
        Ok(state
            .documents
            .get(category.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn delete(&self, target: &DeletionTarget) -> Result<String> {
        self.record(Call::Delete(target.clone()));
        let mut state = self.state();
        if let Some((status, body)) = &state.delete_failure {
            return Err(Error::from_text_body(*status, body));
        }
        match target {
            DeletionTarget::Category(category) => {
                if !state.frozen_categories {
                    state.categories.retain(|c| c != category);
                }
                state.documents.remove(category.as_str());
                Ok(format!("Deleted category '{}'", category))
            }
            DeletionTarget::Document { category, document } => {
                if let Some(docs) = state.documents.get_mut(category.as_str()) {
                    docs.retain(|d| d != document);
                }
                Ok(format!("Deleted '{}' from '{}'", document, category))
            }
        }
    }

    async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        self.record(Call::Download(reference.to_string()));
        Ok(b"%PDF-1.4".to_vec())
    }
}

/// Confirmation prompt with a fixed answer that remembers what it was asked.
pub struct ScriptedPrompt {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

/// A valid one-page PDF upload.
pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, b"%PDF-1.4".to_vec(), "application/pdf")
}
