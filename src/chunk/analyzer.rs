//! Sliding-window analysis of a single chunk.

use super::Chunk;
use crate::config::AnalysisConfig;
use crate::detect::{decode_preview, Candidate, DetectorSet, Window};
use crate::dispatch::{CancelToken, ChunkProcessor};
use crate::error::{ChunkFailure, FailureKind};
use crate::model::{truncate_sample, ChunkAnalysis, EncodedSpan};
use crate::score;

/// Share of suspect characters above which text is rejected as malformed.
const MALFORMED_RATIO: f64 = 0.5;

/// Cut `text` into overlapping windows of `size` characters.
///
/// Consecutive windows start `step` characters apart and the last window is
/// aligned to the end of the text, so every character lands in at least one
/// window. Text no longer than `size` yields a single window.
pub fn sliding_windows(text: &str, size: usize, step: usize) -> Vec<Window<'_>> {
    let size = size.max(1);
    let step = step.max(1);
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let chars = bounds.len() - 1;

    if chars <= size {
        return vec![Window::whole(text)];
    }

    let window_at = |start: usize| Window {
        text: &text[bounds[start]..bounds[start + size]],
        offset: bounds[start],
        clipped_start: start > 0,
        clipped_end: start + size < chars,
    };

    let last = chars - size;
    let mut windows: Vec<Window<'_>> = (0..last).step_by(step).map(window_at).collect();
    windows.push(window_at(last));
    windows
}

/// Windows over a chunk's text, with the edges shared with neighboring
/// chunks marked as clipped.
///
/// A run touching such an edge may continue in the next chunk, so it is
/// scanned as a fragment. The page terminator closing a chunk that has a
/// successor is left out of the scan so a run can reach the edge.
fn chunk_windows<'a>(chunk: &Chunk, text: &'a str, size: usize, step: usize) -> Vec<Window<'a>> {
    let scanned = if chunk.has_next {
        text.strip_suffix('\n').unwrap_or(text)
    } else {
        text
    };

    let mut windows = sliding_windows(scanned, size, step);
    if let Some(first) = windows.first_mut() {
        first.clipped_start |= chunk.has_previous;
    }
    if let Some(last) = windows.last_mut() {
        last.clipped_end |= chunk.has_next;
    }
    windows
}

/// Runs the detectors over one chunk and scores the result.
#[derive(Debug)]
pub struct ChunkAnalyzer {
    config: AnalysisConfig,
    detectors: DetectorSet,
}

impl ChunkAnalyzer {
    /// Create an analyzer with the standard detectors.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_detectors(config, DetectorSet::from_config(config))
    }

    /// Create an analyzer with a custom detector set.
    pub fn with_detectors(config: &AnalysisConfig, detectors: DetectorSet) -> Self {
        Self {
            config: config.clone(),
            detectors,
        }
    }

    /// Analyze a chunk.
    ///
    /// The cancel token is checked between windows; a cancelled run ends in a
    /// `Timeout` failure.
    pub fn analyze(
        &self,
        chunk: &Chunk,
        cancel: &CancelToken,
    ) -> std::result::Result<ChunkAnalysis, ChunkFailure> {
        let text = chunk.text();
        if text.trim().is_empty() {
            return Err(ChunkFailure::empty_text(chunk.index));
        }
        if let Some(ratio) = malformed_ratio(&text) {
            return Err(ChunkFailure::new(
                chunk.index,
                FailureKind::MalformedText,
                format!(
                    "{:.0}% of characters are replacement or control characters",
                    ratio * 100.0
                ),
            ));
        }

        let windows = chunk_windows(
            chunk,
            &text,
            self.config.window_size,
            self.config.window_step(),
        );
        let mut candidates = Vec::new();
        for window in &windows {
            if cancel.is_cancelled() {
                return Err(ChunkFailure::timeout(
                    chunk.index,
                    "analysis cancelled before completion",
                ));
            }
            candidates.extend(self.detectors.run(window).into_iter().map(|c| Candidate {
                start: c.start + window.offset,
                ..c
            }));
        }

        let mut spans = merge_candidates(candidates);
        for span in &mut spans {
            let raw = &text[span.offset..span.end()];
            span.sample = truncate_sample(raw, self.config.sample_len);
            span.decoded_preview = decode_preview(span.kind, raw);
        }

        let flagged_bytes = score::covered_bytes(&spans);
        let suspicion_score = score::chunk_score(&spans, text.len());
        let reasons = score::reasons(&spans, text.len());

        log::debug!(
            "chunk {} (pages {}..{}): {} windows, {} spans, score {:.3}",
            chunk.index,
            chunk.start_page,
            chunk.end_page,
            windows.len(),
            spans.len(),
            suspicion_score
        );

        Ok(ChunkAnalysis {
            chunk_index: chunk.index,
            start_page: chunk.start_page,
            end_page: chunk.end_page,
            text,
            tables: chunk.tables(),
            visual_elements: chunk.visual_elements(),
            encoded_spans: spans,
            suspicion_score: Some(suspicion_score),
            flagged_bytes,
            reasons,
            error: None,
        })
    }
}

impl ChunkProcessor for ChunkAnalyzer {
    fn process(
        &self,
        chunk: &Chunk,
        cancel: &CancelToken,
    ) -> std::result::Result<ChunkAnalysis, ChunkFailure> {
        self.analyze(chunk, cancel)
    }
}

/// Share of replacement/control characters, when it exceeds the limit.
fn malformed_ratio(text: &str) -> Option<f64> {
    let mut total = 0usize;
    let mut suspect = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if c == char::REPLACEMENT_CHARACTER || c.is_control() {
            suspect += 1;
        }
    }
    if total == 0 {
        return None;
    }
    let ratio = suspect as f64 / total as f64;
    (ratio > MALFORMED_RATIO).then_some(ratio)
}

/// Merge same-kind candidates that overlap or touch.
///
/// Output is sorted by `(offset, kind)`.
fn merge_candidates(mut candidates: Vec<Candidate>) -> Vec<EncodedSpan> {
    candidates.sort_by_key(|c| (c.kind, c.start, c.len));

    let mut spans: Vec<EncodedSpan> = Vec::new();
    for candidate in candidates {
        let span = EncodedSpan::new(
            candidate.start,
            candidate.len,
            candidate.kind,
            candidate.confidence,
        );
        match spans.last_mut() {
            Some(last) if last.kind == span.kind && last.touches(&span) => last.absorb(&span),
            _ => spans.push(span),
        }
    }

    spans.sort_by_key(|s| (s.offset, s.kind));
    spans
}
