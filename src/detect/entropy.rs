//! Shannon entropy detector.

use std::collections::HashMap;

use super::{Candidate, Detector, Window};
use crate::model::EncodingKind;

/// Windows shorter than this (in characters) are not scored.
pub const MIN_ENTROPY_WINDOW: usize = 32;

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_RANGE: f64 = 0.45;

/// Computes the Shannon entropy of a string over its characters.
///
/// Returns bits per character: 0.0 for a string of one repeated character,
/// `log2(n)` for `n` distinct characters in equal proportion.
pub fn shannon_entropy(text: &str) -> f64 {
    let mut freq: HashMap<char, usize> = HashMap::new();
    let mut len = 0usize;
    for c in text.chars() {
        *freq.entry(c).or_insert(0) += 1;
        len += 1;
    }
    if len == 0 {
        return 0.0;
    }
    let len = len as f64;
    // Sorted so the floating-point sum does not depend on hash order.
    let mut counts: Vec<usize> = freq.into_values().collect();
    counts.sort_unstable();
    counts.iter().fold(0.0, |acc, &count| {
        let p = count as f64 / len;
        acc - p * p.log2()
    })
}

/// Flags windows whose character entropy exceeds a threshold.
#[derive(Debug, Clone)]
pub struct EntropyDetector {
    threshold: f64,
    ceiling: f64,
}

impl EntropyDetector {
    /// Create a detector flagging entropy above `threshold`, with confidence
    /// saturating at `ceiling`.
    pub fn new(threshold: f64, ceiling: f64) -> Self {
        Self { threshold, ceiling }
    }

    /// Confidence for a measured entropy, or `None` at or below threshold.
    pub fn confidence(&self, entropy: f64) -> Option<f64> {
        if entropy <= self.threshold {
            return None;
        }
        let span = (self.ceiling - self.threshold).max(f64::EPSILON);
        let ratio = ((entropy - self.threshold) / span).clamp(0.0, 1.0);
        Some(BASE_CONFIDENCE + CONFIDENCE_RANGE * ratio)
    }
}

impl Detector for EntropyDetector {
    fn kind(&self) -> EncodingKind {
        EncodingKind::HighEntropy
    }

    fn detect(&self, window: &Window<'_>) -> Vec<Candidate> {
        if window.char_len() < MIN_ENTROPY_WINDOW {
            return Vec::new();
        }
        let entropy = shannon_entropy(window.text);
        match self.confidence(entropy) {
            Some(confidence) => {
                log::trace!(
                    "high entropy window at {}: {:.3} bits/char",
                    window.offset,
                    entropy
                );
                vec![Candidate::new(
                    EncodingKind::HighEntropy,
                    0,
                    window.text.len(),
                    confidence,
                )]
            }
            None => Vec::new(),
        }
    }
}
