//! Hexadecimal run detector.

use regex::Regex;

use super::decode::{decode_bytes, looks_binary};
use super::{Candidate, Detector, Window};
use crate::model::EncodingKind;

/// Digit-only runs shorter than this are treated as numbers, not hex.
const MIN_DIGIT_RUN: usize = 32;

/// Detects runs of hexadecimal digits.
#[derive(Debug, Clone)]
pub struct HexDetector {
    min_len: usize,
    run_regex: Regex,
}

impl HexDetector {
    /// Create a detector for runs of at least `min_len` hex digits.
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(2),
            run_regex: Regex::new(r"[0-9A-Fa-f]+").unwrap(),
        }
    }

    fn score(&self, run: &str, truncated: bool) -> Option<f64> {
        if run.len() < self.min_len {
            return None;
        }
        if !truncated && run.len() % 2 != 0 {
            return None;
        }
        if run.len() < MIN_DIGIT_RUN && run.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let growth = ((run.len() - self.min_len) as f64 / 64.0).min(1.0);
        let mut confidence = 0.5 + 0.4 * growth;
        if decode_bytes(EncodingKind::Hex, run).is_some_and(|bytes| looks_binary(&bytes)) {
            confidence += 0.05;
        }
        Some(confidence.min(0.95))
    }
}

impl Detector for HexDetector {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Hex
    }

    fn detect(&self, window: &Window<'_>) -> Vec<Candidate> {
        self.run_regex
            .find_iter(window.text)
            .filter_map(|m| {
                let truncated = window.is_truncated(m.start(), m.end());
                self.score(m.as_str(), truncated)
                    .map(|c| Candidate::new(EncodingKind::Hex, m.start(), m.len(), c))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> HexDetector {
        HexDetector::new(16)
    }

    #[test]
    fn test_hex_run_flagged() {
        let text = "digest 0a1b2c3d4e5f60718293a4b5c6d7e8f9 computed";
        let found = detector().detect(&Window::whole(text));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 7);
        assert_eq!(found[0].len, 32);
        // 0.5 + 0.4 * 16/64, plus the binary bonus
        assert!((found[0].confidence - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_text_payload_has_no_bonus() {
        let text = "68656c6c6f2c20776f726c64212121";
        let found = detector().detect(&Window::whole(text));
        assert_eq!(found.len(), 1);
        let expected = 0.5 + 0.4 * (14.0 / 64.0);
        assert!((found[0].confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_short_and_odd_runs_ignored() {
        assert!(detector().detect(&Window::whole("cafebabe")).is_empty());
        assert!(detector().detect(&Window::whole("0a1b2c3d4e5f607")).is_empty());
        assert!(detector().detect(&Window::whole("0a1b2c3d4e5f60718")).is_empty());
    }

    #[test]
    fn test_phone_numbers_ignored() {
        let text = "call 4155550100123456 or 20240101120000";
        assert!(detector().detect(&Window::whole(text)).is_empty());
    }

    #[test]
    fn test_long_digit_run_flagged() {
        let text = "1234567890".repeat(4);
        assert_eq!(detector().detect(&Window::whole(&text)).len(), 1);
    }

    #[test]
    fn test_confidence_capped() {
        let text = "deadbeef".repeat(32);
        let found = detector().detect(&Window::whole(&text));
        assert_eq!(found.len(), 1);
        assert!(found[0].confidence <= 0.95);
    }
}
