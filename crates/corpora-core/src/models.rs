//! Data model shared by the client and the coordinators.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// CATEGORIES
// =============================================================================

/// A user-defined label partitioning uploaded documents.
///
/// Equality is exact; "already exists" checks go through
/// [`Category::eq_ignore_case`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The reserved default category.
    pub fn uncategorized() -> Self {
        Self(defaults::UNCATEGORIZED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another name.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }

    pub fn is_uncategorized(&self) -> bool {
        self.eq_ignore_case(defaults::UNCATEGORIZED)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which listing endpoint feeds the category directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// `GET /categories`
    #[default]
    Catalog,
    /// `GET /list_pdfs?type=categories`
    DeletionIndex,
}

impl std::str::FromStr for CategorySource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "catalog" => Ok(Self::Catalog),
            "deletion_index" => Ok(Self::DeletionIndex),
            _ => Err(Error::Config(format!("Invalid category source: {}", s))),
        }
    }
}

// =============================================================================
// UPLOADS
// =============================================================================

/// One file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content: Vec<u8>,
    /// MIME type as declared by whoever picked the file.
    pub mime_type: String,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content: Vec<u8>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == defaults::PDF_MIME
    }
}

/// Where an upload should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// A category picked from the directory.
    Existing(Category),
    /// Free text typed for a category that is created on first upload.
    New(String),
}

/// A batch of files plus its target, before validation.
#[derive(Debug, Clone)]
pub struct UploadSelection {
    pub target: UploadTarget,
    pub files: Vec<UploadFile>,
}

impl UploadSelection {
    /// Check the batch and resolve the target category.
    ///
    /// Checks run in order and stop at the first failure: new-category name,
    /// non-empty batch, then every file declared as PDF.
    pub fn validate(&self) -> Result<Category> {
        let category = match &self.target {
            UploadTarget::Existing(category) => category.clone(),
            UploadTarget::New(typed) => {
                let typed = typed.trim();
                if typed.is_empty() {
                    return Err(Error::Validation(
                        "Please enter a name for the new category.".to_string(),
                    ));
                }
                Category::new(typed)
            }
        };

        if self.files.is_empty() {
            return Err(Error::Validation(
                "Please select at least one PDF file.".to_string(),
            ));
        }

        if let Some(file) = self.files.iter().find(|f| !f.is_pdf()) {
            return Err(Error::Validation(format!(
                "File '{}' is not a PDF.",
                file.filename
            )));
        }

        Ok(category)
    }

    pub fn is_new_category(&self) -> bool {
        matches!(self.target, UploadTarget::New(_))
    }
}

// =============================================================================
// ANSWERS
// =============================================================================

/// A metadata value the service may send as a number, as text ("N/A"), or as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(i64),
    Float(f64),
    Text(String),
    #[default]
    Missing,
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Number(n) => write!(f, "{}", n),
            // `3.0` prints as `3`.
            MetaValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{}", *x as i64),
            MetaValue::Float(x) => write!(f, "{}", x),
            MetaValue::Text(s) => f.write_str(s),
            MetaValue::Missing => f.write_str("N/A"),
        }
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        MetaValue::Number(n)
    }
}

/// A single (document, page) reference backing part of an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default = "unknown", deserialize_with = "unknown_if_null")]
    pub pdf_name: String,
    #[serde(default = "unknown", deserialize_with = "unknown_if_null")]
    pub category: String,
    #[serde(default)]
    pub year: MetaValue,
    #[serde(default)]
    pub page: MetaValue,
    #[serde(default = "no_link", deserialize_with = "no_link_if_null")]
    pub download_url: String,
}

fn unknown() -> String {
    "unknown".to_string()
}

fn no_link() -> String {
    "#".to_string()
}

fn unknown_if_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown))
}

fn no_link_if_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(no_link))
}

/// Treats an explicit `null` like an absent key.
fn default_if_null<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Citation {
    /// Deduplication identity. Category and year are not part of it.
    pub fn identity(&self) -> (String, String) {
        (self.pdf_name.clone(), self.page.to_string())
    }
}

/// Answer text plus whatever sources the service attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub results: Vec<Citation>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub sources: Vec<String>,
}

/// Body of `POST /chat`. `category: None` means global scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub question: String,
    pub category: Option<Category>,
}

// =============================================================================
// DELETION
// =============================================================================

/// Deletion form mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionMode {
    #[default]
    Category,
    Document,
}

/// Raw deletion form values; empty strings mean "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionRequest {
    pub mode: DeletionMode,
    pub category: String,
    pub document: String,
}

/// A validated deletion, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionTarget {
    Category(Category),
    Document { category: Category, document: String },
}

impl DeletionRequest {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            mode: DeletionMode::Category,
            category: category.into(),
            document: String::new(),
        }
    }

    pub fn document(category: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            mode: DeletionMode::Document,
            category: category.into(),
            document: document.into(),
        }
    }

    /// Check required fields for the current mode.
    pub fn validate(&self) -> Result<DeletionTarget> {
        match self.mode {
            DeletionMode::Category => {
                if self.category.is_empty() {
                    return Err(Error::Validation(
                        "Please select a category to wipe.".to_string(),
                    ));
                }
                Ok(DeletionTarget::Category(Category::new(&self.category)))
            }
            DeletionMode::Document => {
                if self.category.is_empty() {
                    return Err(Error::Validation("Please select a category.".to_string()));
                }
                if self.document.is_empty() {
                    return Err(Error::Validation("Please select a PDF file.".to_string()));
                }
                Ok(DeletionTarget::Document {
                    category: Category::new(&self.category),
                    document: self.document.clone(),
                })
            }
        }
    }
}

impl DeletionTarget {
    pub fn category(&self) -> &Category {
        match self {
            DeletionTarget::Category(category) => category,
            DeletionTarget::Document { category, .. } => category,
        }
    }

    pub fn document(&self) -> Option<&str> {
        match self {
            DeletionTarget::Category(_) => None,
            DeletionTarget::Document { document, .. } => Some(document),
        }
    }

    /// Wording of the irreversible-action prompt.
    pub fn confirmation_prompt(&self) -> String {
        match self {
            DeletionTarget::Category(category) => format!(
                "Are you sure you want to delete ALL data for category '{}'? This cannot be undone.",
                category
            ),
            DeletionTarget::Document { category, document } => format!(
                "Are you sure you want to delete PDF '{}' from '{}'?",
                document, category
            ),
        }
    }
}
