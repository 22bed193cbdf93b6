//! Document chunking and per-chunk analysis.

mod analyzer;
mod splitter;

pub use analyzer::{sliding_windows, ChunkAnalyzer};
pub use splitter::split_document;

use serde::{Deserialize, Serialize};

use crate::model::{Page, Table, VisualElement};

/// A contiguous run of pages analyzed as one unit.
///
/// Created by [`split_document`] and then only read: the dispatcher shares it
/// with exactly one analyzer invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Chunk position in the chunk plan
    pub index: usize,

    /// Position of the first page in the document's page list
    pub start_page: usize,

    /// Position one past the last page
    pub end_page: usize,

    /// Pages in this chunk
    pub pages: Vec<Page>,

    /// The document continues before this chunk
    pub has_previous: bool,

    /// The document continues after this chunk
    pub has_next: bool,
}

impl Chunk {
    /// Create a chunk of `pages` starting at page position `start_page`.
    pub fn new(index: usize, start_page: usize, pages: Vec<Page>) -> Self {
        Self {
            index,
            start_page,
            end_page: start_page + pages.len(),
            pages,
            has_previous: false,
            has_next: false,
        }
    }

    /// Mark which sides of this chunk border another chunk.
    pub fn with_neighbors(mut self, has_previous: bool, has_next: bool) -> Self {
        self.has_previous = has_previous;
        self.has_next = has_next;
        self
    }

    /// Concatenated page text.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.text_len());
        for page in &self.pages {
            page.push_contribution(&mut text);
        }
        text
    }

    /// Length of [`Chunk::text`] in bytes.
    pub fn text_len(&self) -> usize {
        self.pages.iter().map(Page::contribution_len).sum()
    }

    /// Tables of all pages, in page order.
    pub fn tables(&self) -> Vec<Table> {
        self.pages.iter().flat_map(|p| p.tables.iter().cloned()).collect()
    }

    /// Visual elements of all pages, in page order.
    pub fn visual_elements(&self) -> Vec<VisualElement> {
        self.pages
            .iter()
            .flat_map(|p| p.visual_elements.iter().cloned())
            .collect()
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page-range description of this chunk.
    pub fn bounds(&self) -> ChunkBounds {
        ChunkBounds {
            index: self.index,
            start_page: self.start_page,
            end_page: self.end_page,
        }
    }
}

/// Where a chunk sits in the document, without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkBounds {
    /// Chunk position in the chunk plan
    pub index: usize,

    /// Position of the first page
    pub start_page: usize,

    /// Position one past the last page
    pub end_page: usize,
}

impl ChunkBounds {
    /// Number of pages covered.
    pub fn page_count(&self) -> usize {
        self.end_page - self.start_page
    }
}
