//! Per-chunk analysis record.

use super::{EncodedSpan, Table, VisualElement};
use crate::chunk::Chunk;
use crate::error::ChunkFailure;
use serde::{Deserialize, Serialize};

/// Outcome of analyzing one chunk.
///
/// A failed chunk keeps its text and geometry so the aggregator can still
/// place later chunks at the right document offsets, but it carries no spans
/// and no score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkAnalysis {
    /// Chunk position in the chunk plan
    pub chunk_index: usize,

    /// First page position (inclusive)
    pub start_page: usize,

    /// Last page position (exclusive)
    pub end_page: usize,

    /// Concatenated page text
    pub text: String,

    /// Tables from the chunk's pages, in page order
    pub tables: Vec<Table>,

    /// Visual elements from the chunk's pages, in page order
    pub visual_elements: Vec<VisualElement>,

    /// Detected spans, chunk-relative, sorted by offset
    pub encoded_spans: Vec<EncodedSpan>,

    /// Chunk suspicion score (None when the chunk failed)
    pub suspicion_score: Option<f64>,

    /// Bytes covered by the union of all spans
    pub flagged_bytes: usize,

    /// Why the chunk scored the way it did
    pub reasons: Vec<String>,

    /// Failure, if the chunk could not be analyzed
    pub error: Option<ChunkFailure>,
}

impl ChunkAnalysis {
    /// Build the error-tagged record for a chunk that failed.
    pub fn failed(chunk: &Chunk, failure: ChunkFailure) -> Self {
        Self {
            chunk_index: chunk.index,
            start_page: chunk.start_page,
            end_page: chunk.end_page,
            text: chunk.text(),
            tables: chunk.tables(),
            visual_elements: chunk.visual_elements(),
            encoded_spans: Vec::new(),
            suspicion_score: None,
            flagged_bytes: 0,
            reasons: Vec::new(),
            error: Some(failure),
        }
    }

    /// Check if the chunk was analyzed successfully.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Score usable for aggregation.
    pub fn valid_score(&self) -> Option<f64> {
        match self.error {
            None => self.suspicion_score,
            Some(_) => None,
        }
    }

    /// Chunk text length in bytes.
    pub fn text_len(&self) -> usize {
        self.text.len()
    }
}
