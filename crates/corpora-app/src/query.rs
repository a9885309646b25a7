//! Question answering: scope, in-flight state and answer presentation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

use corpora_core::{Category, ChatRequest, CorpusApi, Error, Result};

use crate::aggregator::{RenderedAnswer, ResultAggregator};
use crate::directory::{CategoryDirectory, ViewPolicy};
use crate::selector::{lock, SharedSelector};
use crate::status::StatusReporter;

/// Re-enables the ask control when dropped, whatever the request outcome.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn start(enabled: &'a AtomicBool) -> Self {
        enabled.store(false, Ordering::SeqCst);
        Self(enabled)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Drives the question form and holds the last rendered answer.
pub struct QueryCoordinator {
    api: Arc<dyn CorpusApi>,
    selector: SharedSelector,
    status: StatusReporter,
    aggregator: ResultAggregator,
    ask_enabled: AtomicBool,
    answer: Mutex<Option<RenderedAnswer>>,
}

impl QueryCoordinator {
    /// Registers the query scope selector with `directory`.
    pub fn new(
        api: Arc<dyn CorpusApi>,
        directory: &CategoryDirectory,
        aggregator: ResultAggregator,
    ) -> Self {
        Self {
            api,
            selector: directory.register(ViewPolicy::Query),
            status: StatusReporter::new("chat"),
            aggregator,
            ask_enabled: AtomicBool::new(true),
            answer: Mutex::new(None),
        }
    }

    pub fn selector(&self) -> &SharedSelector {
        &self.selector
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// False while a question is in flight.
    pub fn is_ask_enabled(&self) -> bool {
        self.ask_enabled.load(Ordering::SeqCst)
    }

    /// The answer currently shown, if any.
    pub fn answer(&self) -> Option<RenderedAnswer> {
        self.answer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_answer(&self, answer: Option<RenderedAnswer>) {
        *self.answer.lock().unwrap_or_else(|e| e.into_inner()) = answer;
    }

    /// Ask using the scope selector; the empty value means global search.
    pub async fn ask_selected(&self, question: &str) -> Result<RenderedAnswer> {
        let value = lock(&self.selector).value().to_string();
        let scope = (!value.is_empty()).then(|| Category::new(value));
        self.ask(question, scope).await
    }

    /// Ask a question within `scope` (`None` = all categories).
    ///
    /// The previous answer is hidden while the request runs and stays
    /// hidden if it fails. Concurrent calls are not fenced; the last
    /// response to arrive is the one shown.
    #[instrument(skip(self, question), fields(component = "query", op = "ask", scope = ?scope))]
    pub async fn ask(&self, question: &str, scope: Option<Category>) -> Result<RenderedAnswer> {
        let question = question.trim();
        if question.is_empty() {
            let e = Error::Validation("Please enter a question.".to_string());
            self.status.error(e.to_string());
            return Err(e);
        }

        self.status.loading("Thinking...");
        self.set_answer(None);
        let _in_flight = InFlight::start(&self.ask_enabled);

        let request = ChatRequest {
            question: question.to_string(),
            category: scope,
        };

        match self.api.ask(&request).await {
            Ok(result) => {
                let rendered = self.aggregator.render(&result);
                info!(source_count = rendered.sources.len(), "Answer received");
                self.set_answer(Some(rendered.clone()));
                self.status.hide();
                Ok(rendered)
            }
            Err(e) => {
                self.status.error(format!("Error: {}", e));
                Err(e)
            }
        }
    }
}
