//! Category directory: the single client-side copy of the category list.
//!
//! The directory owns the snapshot. Selectors are registered with a
//! [`ViewPolicy`] and re-rendered from the snapshot on every successful
//! refresh; they never hold categories of their own between refreshes.

use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, error, instrument, trace};

use corpora_core::defaults;
use corpora_core::{Category, CategorySource, CorpusApi, DirectoryFeed, DirectorySnapshot};

use crate::selector::{lock, SelectOption, Selector, SharedSelector};

/// How a selector presents the directory snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPolicy {
    /// `uncategorized` first, snapshot without it, then the add-new sentinel.
    Upload,
    /// Global-scope option, then the raw snapshot.
    Query,
    /// Empty placeholder, then the raw snapshot.
    Deletion,
}

impl ViewPolicy {
    /// Build the option list for a snapshot.
    pub fn render(&self, snapshot: &[Category]) -> Vec<SelectOption> {
        let mut options = Vec::with_capacity(snapshot.len() + 2);

        match self {
            ViewPolicy::Upload => {
                options.push(SelectOption::new(
                    defaults::UNCATEGORIZED,
                    defaults::UNCATEGORIZED_LABEL,
                ));
                options.extend(
                    snapshot
                        .iter()
                        .filter(|c| !c.is_uncategorized())
                        .map(|c| SelectOption::plain(c.as_str())),
                );
                options.push(SelectOption::new(
                    defaults::NEW_CATEGORY_OPTION,
                    defaults::NEW_CATEGORY_LABEL,
                ));
            }
            ViewPolicy::Query => {
                options.push(SelectOption::new("", defaults::ALL_CATEGORIES_LABEL));
                options.extend(snapshot.iter().map(|c| SelectOption::plain(c.as_str())));
            }
            ViewPolicy::Deletion => {
                options.push(SelectOption::new("", defaults::SELECT_CATEGORY_LABEL));
                options.extend(snapshot.iter().map(|c| SelectOption::plain(c.as_str())));
            }
        }

        options
    }
}

/// Fetches the category list and keeps every dependent selector in sync.
pub struct CategoryDirectory {
    api: Arc<dyn CorpusApi>,
    source: CategorySource,
    snapshot: RwLock<Vec<Category>>,
    views: Mutex<Vec<(ViewPolicy, SharedSelector)>>,
    feed: DirectoryFeed,
}

impl CategoryDirectory {
    pub fn new(api: Arc<dyn CorpusApi>, source: CategorySource) -> Self {
        Self {
            api,
            source,
            snapshot: RwLock::new(Vec::new()),
            views: Mutex::new(Vec::new()),
            feed: DirectoryFeed::default(),
        }
    }

    pub fn source(&self) -> CategorySource {
        self.source
    }

    /// Create a selector rendered with `policy`, kept in sync from now on.
    pub fn register(&self, policy: ViewPolicy) -> SharedSelector {
        let selector = Selector::new(policy.render(&self.snapshot())).shared();
        self.views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((policy, Arc::clone(&selector)));
        selector
    }

    /// Current snapshot, in server order.
    pub fn snapshot(&self) -> Vec<Category> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Subscribe to snapshots published after each successful refresh.
    pub fn subscribe(&self) -> broadcast::Receiver<DirectorySnapshot> {
        self.feed.subscribe()
    }

    /// Re-fetch the category list.
    ///
    /// Best effort: on failure the error is logged, the snapshot and every
    /// selector stay as they were, and the previous snapshot is returned.
    #[instrument(skip(self), fields(component = "directory", op = "refresh", source = ?self.source))]
    pub async fn refresh(&self) -> Vec<Category> {
        match self.api.list_categories(self.source).await {
            Ok(categories) => {
                self.replace(categories.clone());
                categories
            }
            Err(e) => {
                error!(error = %e, "Failed to load categories");
                self.snapshot()
            }
        }
    }

    fn replace(&self, categories: Vec<Category>) {
        debug!(category_count = categories.len(), "Replacing directory snapshot");

        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = categories.clone();

        let views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        for (policy, selector) in views.iter() {
            let options = policy.render(&categories);
            trace!(?policy, option_count = options.len(), "Re-rendering selector");
            lock(selector).set_options(options);
        }
        drop(views);

        self.feed.publish(DirectorySnapshot::new(categories));
    }
}
