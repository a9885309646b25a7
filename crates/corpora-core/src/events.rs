//! Change feed for category directory snapshots.
//!
//! Every successful directory refresh publishes the new snapshot here.
//! Consumers that are not selectors (logging, the CLI, tests) subscribe
//! independently; selector views are re-rendered directly by the directory.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::models::Category;

/// A published directory snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySnapshot {
    /// Categories in server order.
    pub categories: Vec<Category>,
    /// When the snapshot replaced its predecessor (UTC).
    pub refreshed_at: DateTime<Utc>,
}

impl DirectorySnapshot {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            refreshed_at: Utc::now(),
        }
    }
}

/// Broadcast channel carrying directory snapshots.
///
/// Slow receivers that fall behind get a `Lagged` error and skip to the
/// newest snapshot, which is all a directory consumer ever needs.
pub struct DirectoryFeed {
    tx: broadcast::Sender<DirectorySnapshot>,
}

impl DirectoryFeed {
    /// Create a new feed with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a snapshot to all subscribers. Dropped when nobody listens.
    pub fn publish(&self, snapshot: DirectorySnapshot) {
        tracing::debug!(
            category_count = snapshot.categories.len(),
            subscriber_count = self.tx.receiver_count(),
            "Directory snapshot published"
        );
        let _ = self.tx.send(snapshot);
    }

    /// Subscribe to future snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<DirectorySnapshot> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for DirectoryFeed {
    fn default() -> Self {
        Self::new(crate::defaults::FEED_CAPACITY)
    }
}
