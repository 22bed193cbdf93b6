//! Binary digit string detector.

use regex::Regex;

use super::{Candidate, Detector, Window};
use crate::model::EncodingKind;

const LONG_RUN: usize = 256;

/// Detects long runs of `0` and `1` that spell out whole bytes.
#[derive(Debug, Clone)]
pub struct BinaryDigitsDetector {
    run_regex: Regex,
}

impl BinaryDigitsDetector {
    /// Create a detector for runs of at least 64 binary digits.
    ///
    /// ```
    /// use pdfsift::detect::{BinaryDigitsDetector, Detector, Window};
    ///
    /// let bits = "01000001".repeat(8);
    /// let found = BinaryDigitsDetector::new().detect(&Window::whole(&bits));
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].len, 64);
    /// ```
    pub fn new() -> Self {
        Self {
            run_regex: Regex::new(r"[01]{64,}").unwrap(),
        }
    }
}

impl Default for BinaryDigitsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for BinaryDigitsDetector {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Binary
    }

    fn detect(&self, window: &Window<'_>) -> Vec<Candidate> {
        self.run_regex
            .find_iter(window.text)
            .filter(|m| m.len() % 8 == 0 || window.is_truncated(m.start(), m.end()))
            .map(|m| {
                let confidence = if m.len() >= LONG_RUN { 0.7 } else { 0.6 };
                Candidate::new(EncodingKind::Binary, m.start(), m.len(), confidence)
            })
            .collect()
    }
}
