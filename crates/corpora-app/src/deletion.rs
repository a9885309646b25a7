//! Deletion workflow: dependent selectors, confirmation and post-delete refresh.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use corpora_core::defaults;
use corpora_core::{
    Category, ConfirmPrompt, CorpusApi, DeletionMode, DeletionRequest, DeletionTarget, Result,
};

use crate::directory::{CategoryDirectory, ViewPolicy};
use crate::selector::{lock, SelectOption, Selector, SharedSelector};
use crate::status::StatusReporter;

/// What happened to a confirmed-or-declined deletion.
#[derive(Debug)]
pub enum DeletionOutcome {
    /// The service accepted the deletion.
    Deleted {
        message: String,
        /// Delayed directory refresh, present after a category wipe.
        scheduled_refresh: Option<JoinHandle<Vec<Category>>>,
    },
    /// The user declined the confirmation; nothing was sent.
    Declined,
}

impl DeletionOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeletionOutcome::Deleted { .. })
    }
}

/// Drives the deletion form in both modes.
pub struct DeletionCoordinator {
    api: Arc<dyn CorpusApi>,
    directory: Arc<CategoryDirectory>,
    confirm: Arc<dyn ConfirmPrompt>,
    status: StatusReporter,
    mode: Mutex<DeletionMode>,
    category_select: SharedSelector,
    document_category_select: SharedSelector,
    document_select: SharedSelector,
    refresh_delay: Duration,
}

impl DeletionCoordinator {
    /// Registers both category selectors with `directory`.
    pub fn new(
        api: Arc<dyn CorpusApi>,
        directory: Arc<CategoryDirectory>,
        confirm: Arc<dyn ConfirmPrompt>,
        refresh_delay: Duration,
    ) -> Self {
        let category_select = directory.register(ViewPolicy::Deletion);
        let document_category_select = directory.register(ViewPolicy::Deletion);
        let mut documents = Selector::placeholder(defaults::SELECT_CATEGORY_FIRST_LABEL);
        documents.set_enabled(false);

        Self {
            api,
            directory,
            confirm,
            status: StatusReporter::new("delete"),
            mode: Mutex::new(DeletionMode::default()),
            category_select,
            document_category_select,
            document_select: documents.shared(),
            refresh_delay,
        }
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    pub fn mode(&self) -> DeletionMode {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Switch form mode. Clears any previous status message.
    pub fn set_mode(&self, mode: DeletionMode) {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner()) = mode;
        self.status.hide();
    }

    /// Category selector of the wipe form.
    pub fn category_selector(&self) -> &SharedSelector {
        &self.category_select
    }

    /// Category selector of the single-document form.
    pub fn document_category_selector(&self) -> &SharedSelector {
        &self.document_category_select
    }

    /// Document selector; depends on the document-category selection.
    pub fn document_selector(&self) -> &SharedSelector {
        &self.document_select
    }

    pub fn select_wipe_category(&self, value: &str) -> bool {
        lock(&self.category_select).select(value)
    }

    pub fn select_document(&self, value: &str) -> bool {
        lock(&self.document_select).select(value)
    }

    /// Pick the category of the single-document form and reload its documents.
    /// Unknown values change nothing and fetch nothing.
    pub async fn select_document_category(&self, value: &str) -> bool {
        if !lock(&self.document_category_select).select(value) {
            debug!(value, "Not a listed category");
            return false;
        }
        self.reload_documents().await;
        true
    }

    /// Repopulate the document selector for the selected category.
    ///
    /// The selector is disabled while loading and stays disabled unless at
    /// least one document is listed.
    #[instrument(skip(self), fields(component = "deletion", op = "reload_documents"))]
    pub async fn reload_documents(&self) {
        let category = lock(&self.document_category_select).value().to_string();

        if category.is_empty() {
            let mut documents = lock(&self.document_select);
            documents.reset_options(vec![SelectOption::new(
                "",
                defaults::SELECT_CATEGORY_FIRST_LABEL,
            )]);
            documents.set_enabled(false);
            return;
        }

        {
            let mut documents = lock(&self.document_select);
            documents.reset_options(vec![SelectOption::new("", defaults::LOADING_LABEL)]);
            documents.set_enabled(false);
        }

        let result = self.api.list_documents(&Category::new(&category)).await;

        let mut documents = lock(&self.document_select);
        match result {
            Ok(names) if names.is_empty() => {
                debug!(%category, "No documents in category");
                documents.reset_options(vec![
                    SelectOption::new("", defaults::SELECT_DOCUMENT_LABEL),
                    SelectOption::disabled("", defaults::NO_DOCUMENTS_LABEL),
                ]);
            }
            Ok(names) => {
                debug!(%category, document_count = names.len(), "Documents listed");
                let mut options = Vec::with_capacity(names.len() + 1);
                options.push(SelectOption::new("", defaults::SELECT_DOCUMENT_LABEL));
                options.extend(names.into_iter().map(SelectOption::plain));
                documents.reset_options(options);
                documents.set_enabled(true);
            }
            Err(e) => {
                warn!(%category, error = %e, "Failed to list documents");
                documents.reset_options(vec![SelectOption::new(
                    "",
                    defaults::DOCUMENTS_ERROR_LABEL,
                )]);
            }
        }
    }

    /// Current form values for the active mode.
    pub fn request(&self) -> DeletionRequest {
        match self.mode() {
            DeletionMode::Category => {
                DeletionRequest::category(lock(&self.category_select).value())
            }
            DeletionMode::Document => DeletionRequest::document(
                lock(&self.document_category_select).value(),
                lock(&self.document_select).value(),
            ),
        }
    }

    /// Execute whatever the form currently holds.
    pub async fn execute(&self) -> Result<DeletionOutcome> {
        let request = self.request();
        self.execute_request(request).await
    }

    /// Validate, confirm and send one deletion.
    ///
    /// A document deletion re-lists the documents of its category. A
    /// category wipe refreshes the directory after the configured delay;
    /// the returned handle resolves to the refreshed snapshot.
    #[instrument(skip(self, request), fields(component = "deletion", op = "execute", mode = ?request.mode))]
    pub async fn execute_request(&self, request: DeletionRequest) -> Result<DeletionOutcome> {
        let target = match request.validate() {
            Ok(target) => target,
            Err(e) => {
                self.status.error(e.to_string());
                return Err(e);
            }
        };

        if !self.confirm.confirm(&target.confirmation_prompt()) {
            debug!("Deletion declined");
            return Ok(DeletionOutcome::Declined);
        }

        self.status.loading("Deleting...");

        let message = match self.api.delete(&target).await {
            Ok(message) => message,
            Err(e) => {
                self.status.error(format!("Delete failed: {}", e));
                return Err(e);
            }
        };

        info!(category = %target.category(), document = ?target.document(), "Deletion accepted");
        self.status.success(&message);

        let scheduled_refresh = match target {
            DeletionTarget::Document { .. } => {
                self.reload_documents().await;
                None
            }
            DeletionTarget::Category(_) => Some(self.schedule_refresh()),
        };

        Ok(DeletionOutcome::Deleted {
            message,
            scheduled_refresh,
        })
    }

    fn schedule_refresh(&self) -> JoinHandle<Vec<Category>> {
        let directory = Arc::clone(&self.directory);
        let delay = self.refresh_delay;
        debug!(delay_ms = delay.as_millis() as u64, "Scheduling directory refresh");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            directory.refresh().await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockCorpusApi, ScriptedPrompt};
    use crate::status::StatusKind;
    use corpora_core::CategorySource;

    struct Fixture {
        api: Arc<MockCorpusApi>,
        directory: Arc<CategoryDirectory>,
        prompt: Arc<ScriptedPrompt>,
        deletion: DeletionCoordinator,
    }

    async fn setup(categories: &[&str], accept: bool) -> Fixture {
        let api = Arc::new(MockCorpusApi::with_categories(categories));
        let directory = Arc::new(CategoryDirectory::new(api.clone(), CategorySource::Catalog));
        let prompt = Arc::new(ScriptedPrompt::new(accept));
        let deletion = DeletionCoordinator::new(
            api.clone(),
            directory.clone(),
            prompt.clone(),
            Duration::from_millis(defaults::REFRESH_DELAY_MS),
        );
        directory.refresh().await;
        Fixture {
            api,
            directory,
            prompt,
            deletion,
        }
    }

    fn deletes(api: &MockCorpusApi) -> Vec<DeletionTarget> {
        api.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(target) => Some(target),
                _ => None,
            })
            .collect()
    }

    fn listings(api: &MockCorpusApi) -> usize {
        api.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::ListDocuments(_)))
            .count()
    }

    fn labels(selector: &SharedSelector) -> Vec<String> {
        lock(selector)
            .options()
            .iter()
            .map(|o| o.label.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_document_mode_without_document_rejected() {
        let f = setup(&["physics"], true).await;
        f.deletion.set_mode(DeletionMode::Document);
        f.deletion.select_document_category("physics").await;

        let err = f.deletion.execute().await.unwrap_err();

        assert_eq!(err.to_string(), "Please select a PDF file.");
        assert!(deletes(&f.api).is_empty());
        assert!(f.prompt.asked().is_empty());
    }

    #[tokio::test]
    async fn test_category_mode_without_category_rejected() {
        let f = setup(&["physics"], true).await;

        let err = f.deletion.execute().await.unwrap_err();

        assert_eq!(err.to_string(), "Please select a category to wipe.");
        assert_eq!(f.deletion.status().current().kind, StatusKind::Error);
        assert!(deletes(&f.api).is_empty());
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let f = setup(&["physics"], false).await;
        f.deletion.select_wipe_category("physics");

        let outcome = f.deletion.execute().await.unwrap();

        assert!(!outcome.is_deleted());
        assert!(deletes(&f.api).is_empty());
        assert_eq!(
            f.prompt.asked(),
            vec![
                "Are you sure you want to delete ALL data for category 'physics'? This cannot be undone."
                    .to_string()
            ]
        );
        assert!(!f.deletion.status().current().is_visible());
    }

    #[tokio::test]
    async fn test_server_error_reported() {
        let f = setup(&["physics"], true).await;
        f.api.fail_delete(404, "category not found");
        f.deletion.select_wipe_category("physics");

        f.deletion.execute().await.unwrap_err();

        let status = f.deletion.status().current();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.message, "Delete failed: category not found");
        assert_eq!(f.directory.snapshot(), vec![Category::new("physics")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_wipe_refreshes_after_delay() {
        let f = setup(&["physics", "math"], true).await;
        let mut feed = f.directory.subscribe();
        f.deletion.select_wipe_category("physics");

        let outcome = f.deletion.execute().await.unwrap();

        let DeletionOutcome::Deleted {
            message,
            scheduled_refresh: Some(refresh),
        } = outcome
        else {
            panic!("expected scheduled refresh");
        };
        assert_eq!(message, "Deleted category 'physics'");
        assert_eq!(f.deletion.status().current().kind, StatusKind::Success);
        // Not yet refreshed.
        assert_eq!(f.directory.snapshot().len(), 2);

        let snapshot = refresh.await.unwrap();

        assert_eq!(snapshot, vec![Category::new("math")]);
        assert_eq!(feed.recv().await.unwrap().categories, snapshot);
        assert_eq!(lock(f.deletion.category_selector()).values(), vec!["", "math"]);
    }

    #[tokio::test]
    async fn test_document_delete_reloads_documents() {
        let f = setup(&["physics"], true).await;
        f.api.set_documents("physics", &["a.pdf", "b.pdf"]);
        f.deletion.set_mode(DeletionMode::Document);
        f.deletion.select_document_category("physics").await;
        assert!(f.deletion.select_document("a.pdf"));

        let outcome = f.deletion.execute().await.unwrap();

        match outcome {
            DeletionOutcome::Deleted {
                scheduled_refresh, ..
            } => assert!(scheduled_refresh.is_none()),
            DeletionOutcome::Declined => panic!("expected deletion"),
        }
        assert_eq!(
            deletes(&f.api),
            vec![DeletionTarget::Document {
                category: Category::new("physics"),
                document: "a.pdf".to_string(),
            }]
        );
        assert_eq!(
            f.prompt.asked(),
            vec!["Are you sure you want to delete PDF 'a.pdf' from 'physics'?".to_string()]
        );
        assert_eq!(lock(f.deletion.document_selector()).values(), vec!["", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_document_selector_states() {
        let f = setup(&["physics", "empty"], true).await;
        f.api.set_documents("physics", &["a.pdf"]);

        let documents = f.deletion.document_selector();
        assert_eq!(labels(documents), vec!["(Select Category First)"]);
        assert!(!lock(documents).is_enabled());

        f.deletion.select_document_category("physics").await;
        assert_eq!(labels(documents), vec!["-- Select PDF --", "a.pdf"]);
        assert!(lock(documents).is_enabled());

        f.deletion.select_document_category("empty").await;
        assert_eq!(labels(documents), vec!["-- Select PDF --", "No PDFs found"]);
        assert!(!lock(documents).is_enabled());
        assert!(lock(documents).options()[1].disabled);

        f.deletion.select_document_category("").await;
        assert_eq!(labels(documents), vec!["(Select Category First)"]);
        assert!(!lock(documents).is_enabled());
    }

    #[tokio::test]
    async fn test_document_listing_failure() {
        let f = setup(&["physics"], true).await;
        f.api.fail_documents(500, "");

        f.deletion.select_document_category("physics").await;

        let documents = f.deletion.document_selector();
        assert_eq!(labels(documents), vec!["Error loading PDFs"]);
        assert!(!lock(documents).is_enabled());
    }

    #[tokio::test]
    async fn test_unknown_document_category_fetches_nothing() {
        let f = setup(&["physics"], true).await;
        f.api.set_documents("physics", &["a.pdf"]);
        f.deletion.select_document_category("physics").await;
        let listed = listings(&f.api);

        assert!(!f.deletion.select_document_category("chemistry").await);

        assert_eq!(listings(&f.api), listed);
        assert_eq!(lock(f.deletion.document_category_selector()).value(), "physics");
        assert_eq!(lock(f.deletion.document_selector()).values(), vec!["", "a.pdf"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wipe_keeps_other_document_category_selection() {
        let f = setup(&["physics", "math"], true).await;
        f.api.set_documents("physics", &["a.pdf"]);
        f.deletion.select_document_category("physics").await;
        f.deletion.select_wipe_category("math");

        let outcome = f.deletion.execute().await.unwrap();
        let DeletionOutcome::Deleted {
            scheduled_refresh: Some(refresh),
            ..
        } = outcome
        else {
            panic!("expected scheduled refresh");
        };
        refresh.await.unwrap();

        assert_eq!(lock(f.deletion.document_category_selector()).value(), "physics");
        assert_eq!(lock(f.deletion.category_selector()).value(), "");
    }

    #[tokio::test]
    async fn test_mode_switch_clears_status() {
        let f = setup(&["physics"], true).await;
        f.deletion.execute().await.unwrap_err();
        assert!(f.deletion.status().current().is_visible());

        f.deletion.set_mode(DeletionMode::Document);

        assert_eq!(f.deletion.mode(), DeletionMode::Document);
        assert!(!f.deletion.status().current().is_visible());
    }
}
