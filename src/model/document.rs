//! Document-level types.

use super::Page;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// An extracted PDF document, as supplied by the upstream extraction layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Pages in reading order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from pages.
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self {
            metadata: Metadata::default(),
            pages: pages.into_iter().collect(),
        }
    }

    /// Create a document from plain page texts, indexing pages from 0.
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::from_pages(
            texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| Page::new(i as u32, text)),
        )
    }

    /// Decode a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Full document text: every page's contribution, in page order.
    pub fn full_text(&self) -> String {
        let mut text = String::with_capacity(
            self.pages.iter().map(Page::contribution_len).sum(),
        );
        for page in &self.pages {
            page.push_contribution(&mut text);
        }
        text
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: Option<String>,

    /// Page count of the source file (may exceed the pages supplied)
    pub page_count: Option<u32>,
}

impl Metadata {
    /// Check whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}
