//! Encoded span types.

use serde::{Deserialize, Serialize};

/// Encoding suspected for a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EncodingKind {
    /// Base64 alphabet run with valid padding
    Base64,
    /// Hexadecimal digit run
    Hex,
    /// Dense `%XX` escapes
    #[serde(rename = "URLEncoded")]
    UrlEncoded,
    /// Window with unusually high character entropy
    HighEntropy,
    /// Consecutive `\uXXXX` escapes
    UnicodeEscape,
    /// Long run of binary digits
    Binary,
}

impl EncodingKind {
    /// All kinds, in reporting order.
    pub const ALL: [EncodingKind; 6] = [
        EncodingKind::Base64,
        EncodingKind::Hex,
        EncodingKind::UrlEncoded,
        EncodingKind::HighEntropy,
        EncodingKind::UnicodeEscape,
        EncodingKind::Binary,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            EncodingKind::Base64 => "Base64",
            EncodingKind::Hex => "hexadecimal",
            EncodingKind::UrlEncoded => "URL-encoded",
            EncodingKind::HighEntropy => "high-entropy",
            EncodingKind::UnicodeEscape => "unicode-escaped",
            EncodingKind::Binary => "binary-digit",
        }
    }
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A range of text suspected to carry an encoded payload.
///
/// Offsets are UTF-8 byte offsets. Inside a [`ChunkAnalysis`](super::ChunkAnalysis)
/// they are relative to the chunk text; inside a
/// [`DocumentReport`](super::DocumentReport) they are relative to the document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedSpan {
    /// Start offset in bytes
    pub offset: usize,

    /// Length in bytes
    pub length: usize,

    /// Suspected encoding
    pub kind: EncodingKind,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Matched text, truncated for reporting
    pub sample: String,

    /// Readable decoding of the payload, when it decodes to text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_preview: Option<String>,
}

impl EncodedSpan {
    /// Create a span without sample text.
    pub fn new(offset: usize, length: usize, kind: EncodingKind, confidence: f64) -> Self {
        Self {
            offset,
            length,
            kind,
            confidence,
            sample: String::new(),
            decoded_preview: None,
        }
    }

    /// End offset (exclusive).
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Check whether `other` overlaps or directly follows this span.
    pub fn touches(&self, other: &EncodedSpan) -> bool {
        other.offset <= self.end() && self.offset <= other.end()
    }

    /// Grow this span to cover `other`, keeping the higher confidence.
    pub fn absorb(&mut self, other: &EncodedSpan) {
        let start = self.offset.min(other.offset);
        let end = self.end().max(other.end());
        self.offset = start;
        self.length = end - start;
        self.confidence = self.confidence.max(other.confidence);
    }

    /// Copy of this span moved by `delta` bytes.
    pub fn shifted(&self, delta: usize) -> Self {
        Self {
            offset: self.offset + delta,
            ..self.clone()
        }
    }
}

/// Truncate `text` to at most `max_chars` characters, marking the cut.
pub(crate) fn truncate_sample(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_touches_and_absorb() {
        let mut a = EncodedSpan::new(10, 10, EncodingKind::Base64, 0.6);
        let b = EncodedSpan::new(20, 5, EncodingKind::Base64, 0.9);
        let c = EncodedSpan::new(26, 5, EncodingKind::Base64, 0.9);

        assert!(a.touches(&b));
        assert!(!a.touches(&c));

        a.absorb(&b);
        assert_eq!(a.offset, 10);
        assert_eq!(a.end(), 25);
        assert_eq!(a.confidence, 0.9);
    }

    #[test]
    fn test_shifted() {
        let span = EncodedSpan::new(3, 4, EncodingKind::Hex, 0.5).shifted(100);
        assert_eq!(span.offset, 103);
        assert_eq!(span.length, 4);
    }

    #[test]
    fn test_kind_serializes_url_encoded() {
        let json = serde_json::to_string(&EncodingKind::UrlEncoded).unwrap();
        assert_eq!(json, "\"URLEncoded\"");
    }

    #[test]
    fn test_truncate_sample_respects_char_boundaries() {
        assert_eq!(truncate_sample("abcdef", 3), "abc...");
        assert_eq!(truncate_sample("abc", 3), "abc");
        assert_eq!(truncate_sample("ééééé", 2), "éé...");
    }
}
