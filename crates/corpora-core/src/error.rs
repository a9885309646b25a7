//! Error types for the corpora client.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias using corpora's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for corpora operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid input, detected before any network call.
    /// The message is shown to the user verbatim.
    #[error("{0}")]
    Validation(String),

    /// The service answered with a non-success status.
    /// `message` is the server-provided detail or a status-coded fallback.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// HTTP/network request failed before a response arrived
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error envelope returned by the corpus service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl Error {
    /// Generic message used when the server gives no usable detail.
    pub fn status_fallback(status: u16) -> String {
        format!("Server Error: {}", status)
    }

    /// Build a server error from a plain-text body.
    ///
    /// The body is used verbatim unless it is empty.
    pub fn from_text_body(status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            Self::status_fallback(status)
        } else {
            body.to_string()
        };
        Error::Server { status, message }
    }

    /// Build a server error from a JSON body carrying an `error` field.
    ///
    /// Absent, malformed, or empty bodies fall back to the status-coded message.
    pub fn from_json_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| Self::status_fallback(status));
        Error::Server { status, message }
    }

    /// True for errors raised locally before any request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
