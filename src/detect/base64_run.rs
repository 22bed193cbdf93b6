//! Base64 run detector.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use super::decode::{decode_bytes, looks_binary};
use super::{Candidate, Detector, Window};
use crate::model::EncodingKind;

/// Detects runs of the standard Base64 alphabet.
#[derive(Debug, Clone)]
pub struct Base64Detector {
    min_len: usize,
    run_regex: Regex,
}

impl Base64Detector {
    /// Create a detector for runs of at least `min_len` characters.
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(4),
            run_regex: Regex::new(r"[A-Za-z0-9+/]+={0,2}").unwrap(),
        }
    }

    fn score(&self, run: &str, truncated: bool) -> Option<f64> {
        let body = run.trim_end_matches('=');
        let padded = body.len() != run.len();

        if run.len() < self.min_len {
            return None;
        }
        if !truncated && run.len() % 4 != 0 {
            return None;
        }
        if body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        if char_classes(body) < 2 {
            return None;
        }

        let decoded = if truncated {
            decode_bytes(EncodingKind::Base64, run)
        } else {
            STANDARD.decode(run).ok()
        }?;

        let mut confidence = 0.55 + ((run.len() - self.min_len) as f64 / 400.0).min(0.15);
        if padded {
            confidence += 0.05;
        }
        if looks_binary(&decoded) {
            confidence += 0.20;
        }
        Some(confidence.min(0.95))
    }
}

/// Number of character classes (upper, lower, digit, symbol) present.
fn char_classes(body: &str) -> usize {
    let bytes = body.as_bytes();
    [
        bytes.iter().any(u8::is_ascii_uppercase),
        bytes.iter().any(u8::is_ascii_lowercase),
        bytes.iter().any(u8::is_ascii_digit),
        bytes.iter().any(|&b| b == b'+' || b == b'/'),
    ]
    .iter()
    .filter(|&&present| present)
    .count()
}

impl Detector for Base64Detector {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Base64
    }

    fn detect(&self, window: &Window<'_>) -> Vec<Candidate> {
        self.run_regex
            .find_iter(window.text)
            .filter_map(|m| {
                let truncated = window.is_truncated(m.start(), m.end());
                self.score(m.as_str(), truncated)
                    .map(|c| Candidate::new(EncodingKind::Base64, m.start(), m.len(), c))
            })
            .collect()
    }
}
