//! Wire types for the corpus service responses.

use corpora_core::Category;
use serde::Deserialize;

/// `GET /categories` and `GET /list_pdfs?type=categories`.
#[derive(Debug, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// `GET /list_pdfs?category=<name>`.
#[derive(Debug, Deserialize)]
pub struct DocumentsResponse {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub pdfs: Vec<String>,
}

/// `POST /upload` and `DELETE /delete_category`.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
