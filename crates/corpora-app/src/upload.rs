//! Upload workflow: validate a batch, send it, then reconcile the directory.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument, warn};

use corpora_core::defaults;
use corpora_core::{Category, CorpusApi, Result, UploadFile, UploadSelection, UploadTarget};

use crate::directory::{CategoryDirectory, ViewPolicy};
use crate::selector::{lock, SharedSelector};
use crate::status::StatusReporter;

#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<UploadFile>,
    new_category: String,
}

/// Drives the upload form.
pub struct UploadCoordinator {
    api: Arc<dyn CorpusApi>,
    directory: Arc<CategoryDirectory>,
    selector: SharedSelector,
    status: StatusReporter,
    form: Mutex<UploadForm>,
}

impl UploadCoordinator {
    /// Registers the upload category selector with `directory`.
    pub fn new(api: Arc<dyn CorpusApi>, directory: Arc<CategoryDirectory>) -> Self {
        let selector = directory.register(ViewPolicy::Upload);
        Self {
            api,
            directory,
            selector,
            status: StatusReporter::new("upload"),
            form: Mutex::new(UploadForm::default()),
        }
    }

    fn form(&self) -> MutexGuard<'_, UploadForm> {
        self.form.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn selector(&self) -> &SharedSelector {
        &self.selector
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Pick a category option.
    pub fn choose(&self, value: &str) -> bool {
        lock(&self.selector).select(value)
    }

    /// The free-text input is shown exactly while the add-new sentinel is selected.
    pub fn is_new_category_visible(&self) -> bool {
        lock(&self.selector).value() == defaults::NEW_CATEGORY_OPTION
    }

    pub fn set_new_category(&self, name: impl Into<String>) {
        self.form().new_category = name.into();
    }

    pub fn new_category(&self) -> String {
        self.form().new_category.clone()
    }

    pub fn set_files(&self, files: Vec<UploadFile>) {
        self.form().files = files;
    }

    pub fn files(&self) -> Vec<UploadFile> {
        self.form().files.clone()
    }

    /// Current form contents as an upload selection.
    pub fn selection(&self) -> UploadSelection {
        let value = lock(&self.selector).value().to_string();
        let form = self.form();
        let target = if value == defaults::NEW_CATEGORY_OPTION {
            UploadTarget::New(form.new_category.clone())
        } else {
            UploadTarget::Existing(Category::new(value))
        };
        UploadSelection {
            target,
            files: form.files.clone(),
        }
    }

    /// Submit whatever the form currently holds.
    pub async fn submit(&self) -> Result<String> {
        let selection = self.selection();
        self.submit_selection(selection).await
    }

    /// Validate and upload a batch.
    ///
    /// Nothing is sent when validation fails. On success with a new category
    /// the directory is refreshed and the new category becomes the selection.
    /// On failure the form keeps its contents so the user can retry.
    #[instrument(skip(self, selection), fields(component = "upload", op = "submit", file_count = selection.files.len()))]
    pub async fn submit_selection(&self, selection: UploadSelection) -> Result<String> {
        let category = match selection.validate() {
            Ok(category) => category,
            Err(e) => {
                self.status.error(e.to_string());
                return Err(e);
            }
        };

        self.status.loading(format!(
            "Uploading {} file(s)...",
            selection.files.len()
        ));

        match self.api.upload(&category, &selection.files).await {
            Ok(message) => {
                let message = if message.is_empty() {
                    "Upload successful!".to_string()
                } else {
                    message
                };
                info!(category = %category, "Upload accepted");
                self.status.success(&message);

                {
                    let mut form = self.form();
                    form.files.clear();
                    form.new_category.clear();
                }

                if selection.is_new_category() {
                    self.directory.refresh().await;
                    self.reselect(&category);
                }

                Ok(message)
            }
            Err(e) => {
                self.status.error(format!("Upload failed: {}", e));
                Err(e)
            }
        }
    }

    /// Select the refreshed option matching `category`, ignoring case.
    /// Without a match the selector leaves the sentinel for the first option.
    fn reselect(&self, category: &Category) {
        let mut selector = lock(&self.selector);
        let found = selector.select_where(|o| {
            o.value != defaults::NEW_CATEGORY_OPTION && category.eq_ignore_case(&o.value)
        });
        if !found {
            warn!(category = %category, "Uploaded category not in refreshed directory");
            selector.select_first();
        }
    }
}
