//! Analysis configuration.
//!
//! [`AnalysisConfig`] is an immutable value threaded through the splitter,
//! the analyzer and the dispatcher. It deserializes from the camelCase request
//! shape used by callers, with every field optional.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest accepted window, in characters.
pub const MIN_WINDOW_SIZE: usize = 16;

/// Options for a full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Maximum pages per chunk
    pub chunk_target_pages: usize,

    /// Optional cap on chunk text size in bytes
    pub max_chunk_bytes: Option<usize>,

    /// Detection window size in characters
    pub window_size: usize,

    /// Fraction of the window shared with the next window, in [0, 1)
    pub window_overlap: f64,

    /// Entropy (bits per character) above which a window is flagged
    pub entropy_threshold: f64,

    /// Entropy at which entropy confidence saturates
    pub entropy_ceiling: f64,

    /// Number of worker threads
    pub max_concurrency: usize,

    /// Time budget for a single chunk, in milliseconds
    pub per_chunk_timeout_ms: u64,

    /// Deadline for the whole request, in milliseconds
    pub request_deadline_ms: Option<u64>,

    /// Minimum Base64 run length
    pub min_base64_len: usize,

    /// Minimum hexadecimal run length
    pub min_hex_len: usize,

    /// Minimum share of escaped bytes in a URL-encoded run
    pub url_density_threshold: f64,

    /// Largest gap (bytes) bridged when merging spans across chunk boundaries
    pub boundary_merge_gap: usize,

    /// Document score at or above which the document is flagged
    pub suspicion_threshold: f64,

    /// Maximum characters kept in a span sample
    pub sample_len: usize,
}

impl AnalysisConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of pages per chunk.
    pub fn with_chunk_pages(mut self, pages: usize) -> Self {
        self.chunk_target_pages = pages;
        self
    }

    /// Cap chunk text size in bytes.
    pub fn with_max_chunk_bytes(mut self, bytes: usize) -> Self {
        self.max_chunk_bytes = Some(bytes);
        self
    }

    /// Set window size and overlap.
    pub fn with_window(mut self, size: usize, overlap: f64) -> Self {
        self.window_size = size;
        self.window_overlap = overlap;
        self
    }

    /// Set the entropy threshold.
    pub fn with_entropy_threshold(mut self, threshold: f64) -> Self {
        self.entropy_threshold = threshold;
        self
    }

    /// Set the worker thread count.
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = workers;
        self
    }

    /// Set the per-chunk timeout.
    pub fn with_chunk_timeout(mut self, timeout: Duration) -> Self {
        self.per_chunk_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the request deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline_ms = Some(deadline.as_millis() as u64);
        self
    }

    /// Set the suspicion threshold.
    pub fn with_suspicion_threshold(mut self, threshold: f64) -> Self {
        self.suspicion_threshold = threshold;
        self
    }

    /// Per-chunk timeout as a `Duration`.
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_millis(self.per_chunk_timeout_ms)
    }

    /// Request deadline as a `Duration`.
    pub fn request_deadline(&self) -> Option<Duration> {
        self.request_deadline_ms.map(Duration::from_millis)
    }

    /// Distance between consecutive window starts, in characters.
    pub fn window_step(&self) -> usize {
        let shared = (self.window_size as f64 * self.window_overlap).floor() as usize;
        self.window_size.saturating_sub(shared).max(1)
    }

    /// Splitter view of this configuration.
    pub fn chunking(&self) -> ChunkingOptions {
        ChunkingOptions {
            target_pages: self.chunk_target_pages,
            max_bytes: self.max_chunk_bytes,
        }
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        fn invalid(message: impl Into<String>) -> Result<()> {
            Err(Error::InvalidConfiguration(message.into()))
        }

        if self.chunk_target_pages == 0 {
            return invalid("chunkTargetPages must be positive");
        }
        if self.max_chunk_bytes == Some(0) {
            return invalid("maxChunkBytes must be positive");
        }
        if self.window_size < MIN_WINDOW_SIZE {
            return invalid(format!("windowSize must be at least {}", MIN_WINDOW_SIZE));
        }
        if !(0.0..1.0).contains(&self.window_overlap) {
            return invalid("windowOverlap must be in [0, 1)");
        }
        if !(self.entropy_threshold > 0.0 && self.entropy_threshold < self.entropy_ceiling) {
            return invalid("entropyThreshold must be positive and below entropyCeiling");
        }
        if self.max_concurrency == 0 {
            return invalid("maxConcurrency must be positive");
        }
        if self.per_chunk_timeout_ms == 0 {
            return invalid("perChunkTimeoutMs must be positive");
        }
        if self.request_deadline_ms == Some(0) {
            return invalid("requestDeadlineMs must be positive");
        }
        if self.min_base64_len < 8 || self.min_hex_len < 8 {
            return invalid("minimum Base64 and hex lengths must be at least 8");
        }
        if !(self.url_density_threshold > 0.0 && self.url_density_threshold <= 1.0) {
            return invalid("urlDensityThreshold must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&self.suspicion_threshold) {
            return invalid("suspicionThreshold must be in [0, 1]");
        }
        if self.sample_len == 0 {
            return invalid("sampleLen must be positive");
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_target_pages: 5,
            max_chunk_bytes: None,
            window_size: 256,
            window_overlap: 0.5,
            entropy_threshold: 5.0,
            entropy_ceiling: 5.9,
            max_concurrency: 4,
            per_chunk_timeout_ms: 30_000,
            request_deadline_ms: None,
            min_base64_len: 20,
            min_hex_len: 16,
            url_density_threshold: 0.3,
            boundary_merge_gap: 16,
            suspicion_threshold: 0.5,
            sample_len: 48,
        }
    }
}

/// How the splitter bounds a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    /// Maximum pages per chunk
    pub target_pages: usize,

    /// Optional cap on chunk text size in bytes
    pub max_bytes: Option<usize>,
}

impl ChunkingOptions {
    /// Bound chunks by page count only.
    pub fn pages(target_pages: usize) -> Self {
        Self {
            target_pages,
            max_bytes: None,
        }
    }

    /// Also bound chunks by text size.
    pub fn with_max_bytes(mut self, bytes: usize) -> Self {
        self.max_bytes = Some(bytes);
        self
    }
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        AnalysisConfig::default().chunking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_target_pages, 5);
        assert_eq!(config.window_step(), 128);
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::new()
            .with_chunk_pages(2)
            .with_window(64, 0.25)
            .with_concurrency(8)
            .with_chunk_timeout(Duration::from_millis(250))
            .with_deadline(Duration::from_secs(2));

        assert_eq!(config.chunk_target_pages, 2);
        assert_eq!(config.window_step(), 48);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.chunk_timeout(), Duration::from_millis(250));
        assert_eq!(config.request_deadline(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_zero_overlap_step_is_window() {
        let config = AnalysisConfig::new().with_window(100, 0.0);
        assert_eq!(config.window_step(), 100);
    }

    #[test]
    fn test_validate_rejects_zero_chunk_pages() {
        let config = AnalysisConfig::new().with_chunk_pages(0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = AnalysisConfig::new().with_concurrency(0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_overlap() {
        let config = AnalysisConfig::new().with_window(64, 1.0);
        assert!(config.validate().is_err());

        let config = AnalysisConfig::new().with_window(64, -0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_above_ceiling() {
        let config = AnalysisConfig::new().with_entropy_threshold(6.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let json = r#"{ "chunkTargetPages": 3, "windowOverlap": 0.25, "perChunkTimeoutMs": 500 }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.chunk_target_pages, 3);
        assert_eq!(config.window_overlap, 0.25);
        assert_eq!(config.per_chunk_timeout_ms, 500);
        assert_eq!(config.window_size, 256);
    }
}
