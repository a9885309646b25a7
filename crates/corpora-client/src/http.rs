//! HTTP implementation of the corpus service contract.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use corpora_core::{
    AnswerResult, Category, CategorySource, ChatRequest, CorpusApi, DeletionTarget, Error,
    Result, UploadFile,
};

use crate::config::ClientConfig;
use crate::types::{CategoriesResponse, DocumentsResponse, MessageResponse};

/// How to pull a user-facing message out of a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorBody {
    /// Body text verbatim (upload, delete, listings).
    Text,
    /// `error` field of a JSON body (chat).
    Json,
}

/// `reqwest`-backed corpus service client.
pub struct HttpCorpusApi {
    client: Client,
    config: ClientConfig,
}

impl HttpCorpusApi {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing corpus client: root={}, source={:?}",
            config.api_root, config.category_source
        );

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.api_root.trim_end_matches('/'), endpoint)
    }

    /// Resolve a download reference against the API root.
    ///
    /// Absolute URLs pass through; `/path` resolves against the host;
    /// anything else resolves under the API root.
    pub fn resolve_reference(&self, reference: &str) -> Result<Url> {
        if reference.is_empty() || reference == "#" {
            return Err(Error::Validation(
                "No download link available.".to_string(),
            ));
        }

        let base = Url::parse(&format!(
            "{}/",
            self.config.api_root.trim_end_matches('/')
        ))
        .map_err(|e| Error::Config(format!("Invalid api_root: {}", e)))?;

        base.join(reference)
            .map_err(|e| Error::Validation(format!("Invalid download link '{}': {}", reference, e)))
    }

    async fn send(&self, request: RequestBuilder, policy: ErrorBody) -> Result<Response> {
        let response = request.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!(status, body_len = body.len(), "Corpus service returned an error");

        Err(match policy {
            ErrorBody::Text => Error::from_text_body(status, &body),
            ErrorBody::Json => Error::from_json_body(status, &body),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        policy: ErrorBody,
    ) -> Result<T> {
        let response = self.send(request, policy).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CorpusApi for HttpCorpusApi {
    #[instrument(skip(self), fields(component = "client", op = "list_categories"))]
    async fn list_categories(&self, source: CategorySource) -> Result<Vec<Category>> {
        let request = match source {
            CategorySource::Catalog => self.client.get(self.url("/categories")),
            CategorySource::DeletionIndex => self
                .client
                .get(self.url("/list_pdfs"))
                .query(&[("type", "categories")]),
        };

        let body: CategoriesResponse = self.send_json(request, ErrorBody::Text).await?;
        debug!(category_count = body.categories.len(), "Listed categories");
        Ok(body.categories)
    }

    #[instrument(skip(self, files), fields(component = "client", op = "upload", file_count = files.len()))]
    async fn upload(&self, category: &Category, files: &[UploadFile]) -> Result<String> {
        let start = Instant::now();

        // Each file gets its own key so the receiver can recover any count.
        let mut form = reqwest::multipart::Form::new().text("category", category.to_string());
        for (index, file) in files.iter().enumerate() {
            let part = reqwest::multipart::Part::bytes(file.content.clone())
                .file_name(file.filename.clone())
                .mime_str(&file.mime_type)
                .map_err(|e| {
                    Error::Validation(format!(
                        "Invalid MIME type for '{}': {}",
                        file.filename, e
                    ))
                })?;
            form = form.part(format!("file_{}", index), part);
        }

        let request = self.client.post(self.url("/upload")).multipart(form);
        let body: MessageResponse = self.send_json(request, ErrorBody::Text).await?;

        info!(
            category = %category,
            duration_ms = start.elapsed().as_millis() as u64,
            "Upload complete"
        );
        Ok(body.message)
    }

    #[instrument(skip(self, request), fields(component = "client", op = "ask", prompt_len = request.question.len()))]
    async fn ask(&self, request: &ChatRequest) -> Result<AnswerResult> {
        let start = Instant::now();
        let builder = self.client.post(self.url("/chat")).json(request);
        let answer: AnswerResult = self.send_json(builder, ErrorBody::Json).await?;

        debug!(
            citations = answer.results.len(),
            sources = answer.sources.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Answer received"
        );
        Ok(answer)
    }

    #[instrument(skip(self), fields(component = "client", op = "list_documents"))]
    async fn list_documents(&self, category: &Category) -> Result<Vec<String>> {
        let request = self
            .client
            .get(self.url("/list_pdfs"))
            .query(&[("category", category.as_str())]);

        let body: DocumentsResponse = self.send_json(request, ErrorBody::Text).await?;
        if let Some(echoed) = body.category.as_deref().filter(|c| *c != category.as_str()) {
            warn!(requested = %category, echoed, "Document listing answered for another category");
        }
        debug!(result_count = body.pdfs.len(), "Listed documents");
        Ok(body.pdfs)
    }

    #[instrument(skip(self), fields(component = "client", op = "delete"))]
    async fn delete(&self, target: &DeletionTarget) -> Result<String> {
        let mut query = vec![("category", target.category().as_str())];
        if let Some(document) = target.document() {
            query.push(("pdf_name", document));
        }

        let request = self
            .client
            .delete(self.url("/delete_category"))
            .query(&query);
        let body: MessageResponse = self.send_json(request, ErrorBody::Text).await?;

        info!(category = %target.category(), document = ?target.document(), "Deletion complete");
        Ok(body.message)
    }

    #[instrument(skip(self), fields(component = "client", op = "download"))]
    async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        let url = self.resolve_reference(reference)?;
        let response = self.send(self.client.get(url), ErrorBody::Text).await?;
        let bytes = response.bytes().await?;

        debug!(bytes = bytes.len(), "Download complete");
        Ok(bytes.to_vec())
    }
}
