//! Error types for pdfsift.
//!
//! Two layers exist. [`Error`] is fatal for a whole analysis request and means
//! no report is produced. [`ChunkFailure`] is local to one chunk: it is recorded
//! in the report and never aborts sibling chunks.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pdfsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an analysis request.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading requests or writing reports.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Request or document JSON could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration was rejected before any work was dispatched.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The document has no pages.
    #[error("Document has no pages")]
    EmptyDocument,

    /// The worker pool could not be started.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Chunk results do not line up with the chunk plan.
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// Error while rendering a report.
    #[error("Rendering error: {0}")]
    Render(String),
}

/// Why a single chunk produced no usable analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The chunk contains no text to analyze.
    EmptyChunkText,
    /// The chunk text is dominated by replacement or control characters.
    MalformedText,
    /// The chunk exceeded its time budget or the request deadline.
    Timeout,
    /// The analysis faulted (including panics).
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::EmptyChunkText => write!(f, "EmptyChunkText"),
            FailureKind::MalformedText => write!(f, "MalformedText"),
            FailureKind::Timeout => write!(f, "Timeout"),
            FailureKind::Internal => write!(f, "Internal"),
        }
    }
}

/// A failure confined to one chunk.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("chunk {chunk_index} failed ({kind}): {message}")]
pub struct ChunkFailure {
    /// Index of the failed chunk
    pub chunk_index: usize,

    /// Failure category
    pub kind: FailureKind,

    /// Human-readable detail
    pub message: String,
}

impl ChunkFailure {
    /// Create a new chunk failure.
    pub fn new(chunk_index: usize, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            chunk_index,
            kind,
            message: message.into(),
        }
    }

    /// Chunk has no text.
    pub fn empty_text(chunk_index: usize) -> Self {
        Self::new(
            chunk_index,
            FailureKind::EmptyChunkText,
            "chunk contains no extractable text",
        )
    }

    /// Chunk exceeded its time budget.
    pub fn timeout(chunk_index: usize, message: impl Into<String>) -> Self {
        Self::new(chunk_index, FailureKind::Timeout, message)
    }

    /// Chunk analysis faulted.
    pub fn internal(chunk_index: usize, message: impl Into<String>) -> Self {
        Self::new(chunk_index, FailureKind::Internal, message)
    }
}
