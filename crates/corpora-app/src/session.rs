//! One client session: a shared directory and the three workflows around it.

use std::sync::Arc;
use tracing::info;

use corpora_client::ClientConfig;
use corpora_core::{Category, ConfirmPrompt, CorpusApi, Typesetter};

use crate::aggregator::ResultAggregator;
use crate::deletion::DeletionCoordinator;
use crate::directory::CategoryDirectory;
use crate::query::QueryCoordinator;
use crate::upload::UploadCoordinator;

/// Every coordinator wired to the same [`CategoryDirectory`].
pub struct Session {
    pub directory: Arc<CategoryDirectory>,
    pub upload: UploadCoordinator,
    pub query: QueryCoordinator,
    pub deletion: DeletionCoordinator,
}

impl Session {
    pub fn new(
        api: Arc<dyn CorpusApi>,
        config: &ClientConfig,
        confirm: Arc<dyn ConfirmPrompt>,
        typesetter: Option<Arc<dyn Typesetter>>,
    ) -> Self {
        let directory = Arc::new(CategoryDirectory::new(
            Arc::clone(&api),
            config.category_source,
        ));
        let aggregator = match typesetter {
            Some(typesetter) => ResultAggregator::with_typesetter(typesetter),
            None => ResultAggregator::new(),
        };

        Self {
            upload: UploadCoordinator::new(Arc::clone(&api), Arc::clone(&directory)),
            query: QueryCoordinator::new(Arc::clone(&api), &directory, aggregator),
            deletion: DeletionCoordinator::new(
                api,
                Arc::clone(&directory),
                confirm,
                config.refresh_delay(),
            ),
            directory,
        }
    }

    /// Initial directory load. Every selector is populated once this returns.
    pub async fn start(&self) -> Vec<Category> {
        let categories = self.directory.refresh().await;
        info!(
            category_count = categories.len(),
            source = ?self.directory.source(),
            "Session started"
        );
        categories
    }
}
