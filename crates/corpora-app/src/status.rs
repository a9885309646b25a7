//! Transient status messages, one reporter per UI region.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Visual state of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Hidden,
    Loading,
    Success,
    Error,
}

/// What a status region currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

impl Status {
    fn hidden() -> Self {
        Self {
            kind: StatusKind::Hidden,
            message: String::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.kind != StatusKind::Hidden
    }
}

/// Renders status messages for a single region ("upload", "chat", "delete").
#[derive(Debug)]
pub struct StatusReporter {
    region: &'static str,
    current: Mutex<Status>,
}

impl StatusReporter {
    pub fn new(region: &'static str) -> Self {
        Self {
            region,
            current: Mutex::new(Status::hidden()),
        }
    }

    pub fn region(&self) -> &'static str {
        self.region
    }

    /// Replace the current message.
    pub fn show(&self, kind: StatusKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            StatusKind::Error => warn!(region = self.region, %message, "Status error"),
            StatusKind::Success => info!(region = self.region, %message, "Status success"),
            StatusKind::Loading | StatusKind::Hidden => {
                debug!(region = self.region, %message, ?kind, "Status update")
            }
        }

        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = Status {
            kind,
            message,
            updated_at: Utc::now(),
        };
    }

    pub fn loading(&self, message: impl Into<String>) {
        self.show(StatusKind::Loading, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(StatusKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(StatusKind::Error, message);
    }

    pub fn hide(&self) {
        self.show(StatusKind::Hidden, "");
    }

    /// Snapshot of what the region shows right now.
    pub fn current(&self) -> Status {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
