//! Turns an answer payload into deduplicated, presentable text and sources.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use corpora_core::defaults;
use corpora_core::{AnswerResult, Citation, Typesetter};

/// One row of the citation table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub document: String,
    pub category: String,
    pub year: String,
    pub page: String,
    pub download_url: String,
}

impl From<&Citation> for SourceRow {
    fn from(citation: &Citation) -> Self {
        Self {
            document: citation.pdf_name.clone(),
            category: citation.category.clone(),
            year: citation.year.to_string(),
            page: citation.page.to_string(),
            download_url: citation.download_url.clone(),
        }
    }
}

/// How the sources of an answer are shown.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceListing {
    /// Structured citations, unique by (document, page).
    Table(Vec<SourceRow>),
    /// Plain source names, unique by exact text.
    Inline(Vec<String>),
    NoSources,
}

impl SourceListing {
    /// Inline form: "Sources: a, b", or the no-sources notice.
    pub fn joined(&self) -> String {
        match self {
            SourceListing::Inline(names) => format!("Sources: {}", names.join(", ")),
            SourceListing::Table(rows) => format!(
                "Sources: {}",
                rows.iter()
                    .map(|r| r.document.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            SourceListing::NoSources => defaults::NO_SOURCES.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceListing::Table(rows) => rows.len(),
            SourceListing::Inline(names) => names.len(),
            SourceListing::NoSources => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Answer text plus its source listing, ready to display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAnswer {
    pub text: String,
    pub sources: SourceListing,
}

impl fmt::Display for RenderedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.text)?;
        writeln!(f)?;
        match &self.sources {
            SourceListing::Table(rows) => {
                writeln!(f, "Sources:")?;
                for row in rows {
                    writeln!(
                        f,
                        "  {} [{}] year {} page {} {}",
                        row.document, row.category, row.year, row.page, row.download_url
                    )?;
                }
                Ok(())
            }
            other => writeln!(f, "{}", other.joined()),
        }
    }
}

/// Builds [`RenderedAnswer`]s and runs the optional typesetting pass.
#[derive(Clone, Default)]
pub struct ResultAggregator {
    typesetter: Option<Arc<dyn Typesetter>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_typesetter(typesetter: Arc<dyn Typesetter>) -> Self {
        Self {
            typesetter: Some(typesetter),
        }
    }

    /// Render an answer.
    ///
    /// Structured citations win over plain source names; both are
    /// deduplicated keeping the first occurrence in server order.
    pub fn render(&self, result: &AnswerResult) -> RenderedAnswer {
        let text = result
            .answer
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(defaults::NO_ANSWER)
            .to_string();

        let sources = if !result.results.is_empty() {
            SourceListing::Table(dedup_citations(&result.results))
        } else if !result.sources.is_empty() {
            SourceListing::Inline(dedup_sources(&result.sources))
        } else {
            SourceListing::NoSources
        };

        debug!(
            citation_count = result.results.len(),
            source_count = sources.len(),
            "Answer rendered"
        );

        self.typeset(&text);

        RenderedAnswer { text, sources }
    }

    /// Fire-and-forget typesetting. Failures are logged and never reach the caller.
    fn typeset(&self, text: &str) {
        let Some(typesetter) = self.typesetter.as_ref() else {
            return;
        };
        if !typesetter.is_available() {
            debug!("Typesetter unavailable, skipping");
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime for typesetting pass, skipping");
            return;
        };

        let typesetter = Arc::clone(typesetter);
        let text = text.to_string();
        handle.spawn(async move {
            if let Err(e) = typesetter.typeset(&text).await {
                error!(error = %e, "Typesetting failed");
            }
        });
    }
}

fn dedup_citations(citations: &[Citation]) -> Vec<SourceRow> {
    let mut seen = HashSet::new();
    citations
        .iter()
        .filter(|c| seen.insert(c.identity()))
        .map(SourceRow::from)
        .collect()
}

fn dedup_sources(sources: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use corpora_core::{Error, MetaValue, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn citation(name: &str, page: MetaValue, category: &str) -> Citation {
        Citation {
            pdf_name: name.to_string(),
            category: category.to_string(),
            year: MetaValue::Number(2021),
            page,
            download_url: format!("/download/{}", name),
        }
    }

    #[test]
    fn test_duplicate_citations_collapse() {
        let result = AnswerResult {
            answer: Some("42".to_string()),
            results: vec![
                citation("a.pdf", MetaValue::Number(3), "physics"),
                citation("a.pdf", MetaValue::Number(3), "physics"),
            ],
            sources: vec![],
        };
        let rendered = ResultAggregator::new().render(&result);
        match rendered.sources {
            SourceListing::Table(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].document, "a.pdf");
                assert_eq!(rows[0].page, "3");
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_identity_ignores_category_and_keeps_first() {
        let result = AnswerResult {
            answer: Some("x".to_string()),
            results: vec![
                citation("a.pdf", MetaValue::Number(1), "physics"),
                citation("b.pdf", MetaValue::Number(1), "physics"),
                citation("a.pdf", MetaValue::Number(1), "math"),
                citation("a.pdf", MetaValue::Number(2), "physics"),
            ],
            sources: vec![],
        };
        let SourceListing::Table(rows) = ResultAggregator::new().render(&result).sources else {
            panic!("expected table");
        };
        let keys: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| (r.document.as_str(), r.page.as_str(), r.category.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a.pdf", "1", "physics"),
                ("b.pdf", "1", "physics"),
                ("a.pdf", "2", "physics"),
            ]
        );
    }

    #[test]
    fn test_missing_page_renders_na() {
        let result = AnswerResult {
            answer: Some("x".to_string()),
            results: vec![
                citation("a.pdf", MetaValue::Missing, "c"),
                citation("a.pdf", MetaValue::Text("N/A".to_string()), "c"),
            ],
            sources: vec![],
        };
        let SourceListing::Table(rows) = ResultAggregator::new().render(&result).sources else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].page, "N/A");
    }

    #[test]
    fn test_sources_fallback_dedups_in_order() {
        let result = AnswerResult {
            answer: Some("x".to_string()),
            results: vec![],
            sources: vec!["b.pdf".into(), "a.pdf".into(), "b.pdf".into()],
        };
        let rendered = ResultAggregator::new().render(&result);
        assert_eq!(
            rendered.sources,
            SourceListing::Inline(vec!["b.pdf".to_string(), "a.pdf".to_string()])
        );
        assert_eq!(rendered.sources.joined(), "Sources: b.pdf, a.pdf");
    }

    #[test]
    fn test_no_sources() {
        let rendered = ResultAggregator::new().render(&AnswerResult {
            answer: Some("x".to_string()),
            ..Default::default()
        });
        assert_eq!(rendered.sources, SourceListing::NoSources);
        assert_eq!(rendered.sources.joined(), "No sources found.");
        assert!(rendered.sources.is_empty());
    }

    #[test]
    fn test_missing_answer_placeholder() {
        let rendered = ResultAggregator::new().render(&AnswerResult::default());
        assert_eq!(rendered.text, "No answer received.");

        let rendered = ResultAggregator::new().render(&AnswerResult {
            answer: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(rendered.text, "No answer received.");
    }

    #[test]
    fn test_display_includes_text_and_sources() {
        let rendered = RenderedAnswer {
            text: "Answer".to_string(),
            sources: SourceListing::Inline(vec!["a.pdf".to_string()]),
        };
        let shown = rendered.to_string();
        assert!(shown.starts_with("Answer\n"));
        assert!(shown.contains("Sources: a.pdf"));
    }

    struct FailingTypesetter {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl Typesetter for FailingTypesetter {
        async fn typeset(&self, _text: &str) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Err(Error::Request("renderer crashed".to_string()))
        }
    }

    struct UnavailableTypesetter;

    #[async_trait]
    impl Typesetter for UnavailableTypesetter {
        fn is_available(&self) -> bool {
            false
        }

        async fn typeset(&self, _text: &str) -> Result<()> {
            panic!("must not run");
        }
    }

    #[tokio::test]
    async fn test_typesetter_failure_does_not_affect_answer() {
        let typesetter = Arc::new(FailingTypesetter {
            runs: AtomicUsize::new(0),
        });
        let aggregator = ResultAggregator::with_typesetter(typesetter.clone());

        let rendered = aggregator.render(&AnswerResult {
            answer: Some("E = mc^2".to_string()),
            ..Default::default()
        });
        assert_eq!(rendered.text, "E = mc^2");

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(typesetter.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_typesetter_is_skipped() {
        let aggregator = ResultAggregator::with_typesetter(Arc::new(UnavailableTypesetter));
        let rendered = aggregator.render(&AnswerResult::default());
        tokio::task::yield_now().await;
        assert_eq!(rendered.text, "No answer received.");
    }

    #[test]
    fn test_render_without_runtime() {
        let typesetter = Arc::new(FailingTypesetter {
            runs: AtomicUsize::new(0),
        });
        let aggregator = ResultAggregator::with_typesetter(typesetter.clone());
        aggregator.render(&AnswerResult::default());
        assert_eq!(typesetter.runs.load(Ordering::SeqCst), 0);
    }
}
