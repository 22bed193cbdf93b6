//! `\uXXXX` escape sequence detector.

use regex::Regex;

use super::{Candidate, Detector, Window};
use crate::model::EncodingKind;

const ESCAPE_LEN: usize = 6;

/// Detects two or more consecutive `\uXXXX` escapes.
#[derive(Debug, Clone)]
pub struct UnicodeEscapeDetector {
    run_regex: Regex,
}

impl UnicodeEscapeDetector {
    /// Create a detector for runs of two or more escapes.
    ///
    /// ```
    /// use pdfsift::detect::{Detector, UnicodeEscapeDetector, Window};
    ///
    /// let found = UnicodeEscapeDetector::new().detect(&Window::whole(r"x=\u0041\u0042;"));
    /// assert_eq!(found.len(), 1);
    /// assert_eq!((found[0].start, found[0].len), (2, 12));
    /// ```
    pub fn new() -> Self {
        Self {
            run_regex: Regex::new(r"(?:\\u[0-9A-Fa-f]{4}){2,}").unwrap(),
        }
    }
}

impl Default for UnicodeEscapeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for UnicodeEscapeDetector {
    fn kind(&self) -> EncodingKind {
        EncodingKind::UnicodeEscape
    }

    fn detect(&self, window: &Window<'_>) -> Vec<Candidate> {
        self.run_regex
            .find_iter(window.text)
            .map(|m| {
                let confidence = if m.len() / ESCAPE_LEN >= 8 { 0.85 } else { 0.75 };
                Candidate::new(EncodingKind::UnicodeEscape, m.start(), m.len(), confidence)
            })
            .collect()
    }
}
