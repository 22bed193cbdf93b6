//! # pdfsift
//!
//! Parallel detection of encoded and obfuscated payloads hidden in the text of
//! extracted PDF documents.
//!
//! The library takes a document that an upstream extraction layer has already
//! turned into per-page text, tables and visual elements, splits it into
//! page-aligned chunks, scans every chunk with entropy and pattern detectors on
//! a thread pool, and merges the findings into one [`DocumentReport`].
//!
//! ## Quick Start
//!
//! ```
//! use pdfsift::{analyze, AnalysisConfig, Document, EncodingKind};
//!
//! fn main() -> pdfsift::Result<()> {
//!     let doc = Document::from_texts([
//!         "Quarterly results are attached below.",
//!         "ref: SGVsbG8sIHdvcmxkISBIaWRkZW4gcGF5bG9hZA==",
//!     ]);
//!
//!     let report = analyze(&doc, &AnalysisConfig::default())?;
//!     assert!(report.sections_of_kind(EncodingKind::Base64).count() == 1);
//!     println!("score: {:.2}", report.document_suspicion_score);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Detectors**: Shannon entropy, Base64, hex, URL encoding, `\u` escapes, binary digits
//! - **Chunked analysis**: Page-aligned chunks scanned with overlapping windows
//! - **Parallel processing**: Uses Rayon with per-chunk timeouts and a request deadline
//! - **Partial results**: Failed chunks are reported, never fatal
//! - **C ABI**: Optional `ffi` feature for use from other languages

pub mod aggregate;
pub mod chunk;
pub mod config;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod render;
pub mod score;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use aggregate::{aggregate, aggregate_document};
pub use chunk::{split_document, Chunk, ChunkAnalyzer, ChunkBounds};
pub use config::{AnalysisConfig, ChunkingOptions};
pub use dispatch::{CancelToken, ChunkProcessor, DispatchOptions, Dispatcher};
pub use error::{ChunkFailure, Error, FailureKind, Result};
pub use model::{
    BoundingBox, ChunkAnalysis, Document, DocumentReport, EncodedSpan, EncodingKind, Metadata,
    Page, PageSummary, ReportStats, Table, TableCell, TableRow, VisualElement, VisualKind,
};
pub use render::JsonFormat;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A document together with the configuration to analyze it with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Document to analyze
    pub document: Document,

    /// Analysis options; omitted fields take their defaults
    #[serde(default)]
    pub config: AnalysisConfig,
}

impl AnalysisRequest {
    /// Create a request with the default configuration.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            config: AnalysisConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }
}

/// Analyze a document.
///
/// Fails only when the configuration is invalid, the document has no pages,
/// or the worker pool cannot start. Chunks that fail are listed in the
/// report's `chunk_failures` and left out of the score.
///
/// # Example
///
/// ```
/// use pdfsift::{analyze, AnalysisConfig, Document};
///
/// let doc = Document::from_texts(["nothing to see here"]);
/// let report = analyze(&doc, &AnalysisConfig::default()).unwrap();
/// assert!(!report.suspicious);
/// ```
pub fn analyze(document: &Document, config: &AnalysisConfig) -> Result<DocumentReport> {
    config.validate()?;

    let chunks: Vec<Arc<Chunk>> = split_document(document, &config.chunking())?
        .into_iter()
        .map(Arc::new)
        .collect();
    let bounds: Vec<ChunkBounds> = chunks.iter().map(|c| c.bounds()).collect();

    let analyzer = Arc::new(ChunkAnalyzer::new(config));
    let results = Dispatcher::from_config(config).dispatch(&chunks, analyzer)?;

    aggregate_document(document, &bounds, results, config)
}

/// Analyze a request.
pub fn analyze_request(request: AnalysisRequest) -> Result<DocumentReport> {
    analyze(&request.document, &request.config)
}

/// Decode a request from JSON.
///
/// Accepts either a `{ "document": ..., "config": ... }` envelope or a bare
/// document, which is analyzed with the default configuration.
pub fn parse_request(json: &str) -> Result<AnalysisRequest> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("document").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(AnalysisRequest::new(serde_json::from_value(value)?))
    }
}

/// Analyze a JSON request.
///
/// # Example
///
/// ```
/// let report = pdfsift::analyze_json(
///     r#"{ "pages": [ { "index": 0, "text": "hello" } ] }"#,
/// ).unwrap();
/// assert_eq!(report.text, "hello\n");
/// ```
pub fn analyze_json(json: &str) -> Result<DocumentReport> {
    analyze_request(parse_request(json)?)
}

/// Read a JSON request from a file.
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<AnalysisRequest> {
    let json = std::fs::read_to_string(path)?;
    parse_request(&json)
}

/// Read and analyze a JSON request file.
///
/// # Example
///
/// ```no_run
/// use pdfsift::{analyze_file, render, JsonFormat};
///
/// let report = analyze_file("request.json").unwrap();
/// println!("{}", render::to_json(&report, JsonFormat::Pretty).unwrap());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<DocumentReport> {
    analyze_request(load_request(path)?)
}

/// Read and analyze a JSON request file without blocking the async runtime.
#[cfg(feature = "async")]
pub async fn analyze_file_async<P: AsRef<Path>>(path: P) -> Result<DocumentReport> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let json = String::from_utf8(bytes)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    tokio::task::spawn_blocking(move || analyze_json(&json))
        .await
        .map_err(|e| Error::Dispatch(format!("analysis task failed: {}", e)))?
}

/// Builder for configuring and running an analysis.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pdfsift::{Document, Sift};
///
/// let report = Sift::new()
///     .chunk_pages(2)
///     .window(128, 0.5)
///     .concurrency(2)
///     .chunk_timeout(Duration::from_secs(10))
///     .analyze(&Document::from_texts(["one", "two", "three"]))?;
/// assert_eq!(report.stats.chunk_count, 2);
/// # Ok::<(), pdfsift::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sift {
    config: AnalysisConfig,
}

impl Sift {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Set pages per chunk.
    pub fn chunk_pages(mut self, pages: usize) -> Self {
        self.config = self.config.with_chunk_pages(pages);
        self
    }

    /// Cap chunk text size in bytes.
    pub fn max_chunk_bytes(mut self, bytes: usize) -> Self {
        self.config = self.config.with_max_chunk_bytes(bytes);
        self
    }

    /// Set window size (characters) and overlap fraction.
    pub fn window(mut self, size: usize, overlap: f64) -> Self {
        self.config = self.config.with_window(size, overlap);
        self
    }

    /// Set the entropy threshold in bits per character.
    pub fn entropy_threshold(mut self, threshold: f64) -> Self {
        self.config = self.config.with_entropy_threshold(threshold);
        self
    }

    /// Set the number of worker threads.
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config = self.config.with_concurrency(workers);
        self
    }

    /// Set the per-chunk timeout.
    pub fn chunk_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_chunk_timeout(timeout);
        self
    }

    /// Set the request deadline.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config = self.config.with_deadline(deadline);
        self
    }

    /// Set the score at which a document is flagged.
    pub fn suspicion_threshold(mut self, threshold: f64) -> Self {
        self.config = self.config.with_suspicion_threshold(threshold);
        self
    }

    /// Get the configuration built so far.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a document.
    pub fn analyze(&self, document: &Document) -> Result<DocumentReport> {
        analyze(document, &self.config)
    }

    /// Analyze a bare JSON document with this builder's configuration.
    pub fn analyze_json(&self, json: &str) -> Result<DocumentReport> {
        analyze(&Document::from_json(json)?, &self.config)
    }
}
