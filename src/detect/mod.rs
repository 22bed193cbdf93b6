//! Entropy and pattern detectors.
//!
//! Each detector inspects one [`Window`] of text and returns zero or more
//! [`Candidate`]s. Detectors hold only immutable settings, so a
//! [`DetectorSet`] can be shared across worker threads and applied to windows
//! in any order with identical results.
//!
//! # Example
//!
//! ```
//! use pdfsift::detect::{DetectorSet, Window};
//! use pdfsift::{AnalysisConfig, EncodingKind};
//!
//! let detectors = DetectorSet::from_config(&AnalysisConfig::default());
//! let found = detectors.run(&Window::whole("token=SGVsbG8sIHdvcmxkISBIaWRkZW4gcGF5bG9hZA=="));
//! assert!(found.iter().any(|c| c.kind == EncodingKind::Base64));
//! ```

mod base64_run;
mod binary_digits;
mod decode;
mod entropy;
mod hex_run;
mod unicode_escape;
mod url_encoding;

pub use base64_run::Base64Detector;
pub use binary_digits::BinaryDigitsDetector;
pub use decode::{decode_preview, looks_binary};
pub use entropy::{shannon_entropy, EntropyDetector, MIN_ENTROPY_WINDOW};
pub use hex_run::HexDetector;
pub use unicode_escape::UnicodeEscapeDetector;
pub use url_encoding::UrlEncodingDetector;

use crate::config::AnalysisConfig;
use crate::model::EncodingKind;

/// A slice of chunk text handed to the detectors.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    /// Window text
    pub text: &'a str,

    /// Byte offset of the window in the chunk text
    pub offset: usize,

    /// The window starts inside the chunk text (not at its beginning)
    pub clipped_start: bool,

    /// The window ends inside the chunk text (not at its end)
    pub clipped_end: bool,
}

impl<'a> Window<'a> {
    /// A window covering an entire text.
    pub fn whole(text: &'a str) -> Self {
        Self {
            text,
            offset: 0,
            clipped_start: false,
            clipped_end: false,
        }
    }

    /// Check whether a match may continue past a window edge.
    ///
    /// Such matches are fragments of a longer run, so length and padding
    /// rules cannot be applied to them.
    pub fn is_truncated(&self, start: usize, end: usize) -> bool {
        (start == 0 && self.clipped_start) || (end == self.text.len() && self.clipped_end)
    }

    /// Window length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A raw detection on one window.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Suspected encoding
    pub kind: EncodingKind,

    /// Start offset in the window, in bytes
    pub start: usize,

    /// Length in bytes
    pub len: usize,

    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl Candidate {
    /// Create a candidate, clamping confidence into [0, 1].
    pub fn new(kind: EncodingKind, start: usize, len: usize, confidence: f64) -> Self {
        Self {
            kind,
            start,
            len,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// End offset in the window (exclusive).
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A stateless classifier for one kind of encoding.
pub trait Detector: Send + Sync + std::fmt::Debug {
    /// Encoding this detector reports.
    fn kind(&self) -> EncodingKind;

    /// Inspect a window and return any candidates.
    fn detect(&self, window: &Window<'_>) -> Vec<Candidate>;
}

/// The detectors applied to every window.
#[derive(Debug, Default)]
pub struct DetectorSet {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the standard detector set for a configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut set = Self::new();
        set.register(Box::new(EntropyDetector::new(
            config.entropy_threshold,
            config.entropy_ceiling,
        )));
        set.register(Box::new(Base64Detector::new(config.min_base64_len)));
        set.register(Box::new(HexDetector::new(config.min_hex_len)));
        set.register(Box::new(UrlEncodingDetector::new(
            config.url_density_threshold,
        )));
        set.register(Box::new(UnicodeEscapeDetector::new()));
        set.register(Box::new(BinaryDigitsDetector::new()));
        set
    }

    /// Add a detector.
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Kinds covered by this set.
    pub fn kinds(&self) -> Vec<EncodingKind> {
        self.detectors.iter().map(|d| d.kind()).collect()
    }

    /// Number of detectors.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector on a window.
    pub fn run(&self, window: &Window<'_>) -> Vec<Candidate> {
        self.detectors
            .iter()
            .flat_map(|d| d.detect(window))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "the quick brown fox jumps over the lazy dog ";

    #[test]
    fn test_default_set_covers_all_kinds() {
        let set = DetectorSet::from_config(&AnalysisConfig::default());
        let mut kinds = set.kinds();
        kinds.sort();
        assert_eq!(kinds, EncodingKind::ALL.to_vec());
    }

    #[test]
    fn test_prose_yields_nothing() {
        let set = DetectorSet::from_config(&AnalysisConfig::default());
        let text = PROSE.repeat(8);
        assert!(set.run(&Window::whole(&text)).is_empty());
    }

    #[test]
    fn test_detector_order_does_not_matter() {
        let config = AnalysisConfig::default();
        let forward = DetectorSet::from_config(&config);
        let mut backward = DetectorSet::new();
        backward.register(Box::new(BinaryDigitsDetector::new()));
        backward.register(Box::new(UnicodeEscapeDetector::new()));
        backward.register(Box::new(UrlEncodingDetector::new(config.url_density_threshold)));
        backward.register(Box::new(HexDetector::new(config.min_hex_len)));
        backward.register(Box::new(Base64Detector::new(config.min_base64_len)));
        backward.register(Box::new(EntropyDetector::new(
            config.entropy_threshold,
            config.entropy_ceiling,
        )));

        let text = "id 0a1b2c3d4e5f60718293a4b5c6d7e8f9 then %3Cscript%3Ealert%281%29%3C%2Fscript%3E \
                    and aGlkZGVuIHBheWxvYWQgZ29lcyBoZXJlIQ==";
        let key = |c: &Candidate| (c.kind, c.start, c.len);
        let mut a = forward.run(&Window::whole(text));
        let mut b = backward.run(&Window::whole(text));
        a.sort_by_key(key);
        b.sort_by_key(key);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_window_truncation_edges() {
        let window = Window {
            text: "abcdef",
            offset: 10,
            clipped_start: true,
            clipped_end: false,
        };
        assert!(window.is_truncated(0, 3));
        assert!(!window.is_truncated(1, 6));
        assert!(!Window::whole("abcdef").is_truncated(0, 6));
    }

    #[test]
    fn test_candidate_clamps_confidence() {
        let c = Candidate::new(EncodingKind::Hex, 0, 4, 1.7);
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.end(), 4);
    }
}
