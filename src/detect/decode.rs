//! Payload decoding used for confidence boosts and previews.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::model::EncodingKind;

/// Share of non-printable content above which decoded bytes count as binary.
const BINARY_RATIO: f64 = 0.3;

/// Share of printable characters required for a readable preview.
const READABLE_RATIO: f64 = 0.95;

/// Maximum characters in a decoded preview.
const PREVIEW_CHARS: usize = 50;

/// Accepts padded, unpadded and fragment-truncated input.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode the payload of a span, if the encoding is reversible.
pub(crate) fn decode_bytes(kind: EncodingKind, raw: &str) -> Option<Vec<u8>> {
    if !raw.is_ascii() {
        return None;
    }
    match kind {
        EncodingKind::Base64 => decode_base64(raw),
        EncodingKind::Hex => {
            let even = &raw[..raw.len() - raw.len() % 2];
            hex::decode(even).ok()
        }
        EncodingKind::UrlEncoded => Some(urlencoding::decode_binary(raw.as_bytes()).into_owned()),
        EncodingKind::UnicodeEscape => decode_unicode_escapes(raw).map(String::into_bytes),
        EncodingKind::Binary => {
            if !raw.bytes().all(|b| b == b'0' || b == b'1') {
                return None;
            }
            Some(
                raw.as_bytes()
                    .chunks_exact(8)
                    .map(|bits| bits.iter().fold(0u8, |acc, b| (acc << 1) | (b - b'0')))
                    .collect(),
            )
        }
        EncodingKind::HighEntropy => None,
    }
}

fn decode_base64(raw: &str) -> Option<Vec<u8>> {
    let body = raw.trim_end_matches('=');
    // A single dangling sextet carries no whole byte.
    let body = &body[..body.len() - usize::from(body.len() % 4 == 1)];
    LENIENT_BASE64.decode(body).ok()
}

fn decode_unicode_escapes(raw: &str) -> Option<String> {
    let units = raw
        .split("\\u")
        .filter(|part| !part.is_empty())
        .map(|part| u16::from_str_radix(part.get(..4)?, 16).ok())
        .collect::<Option<Vec<u16>>>()?;
    Some(
        char::decode_utf16(units)
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}

/// Check whether decoded bytes look like binary data rather than text.
pub fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let (odd, total) = match std::str::from_utf8(bytes) {
        Ok(text) => (
            text.chars()
                .filter(|c| c.is_control() && !c.is_whitespace())
                .count(),
            text.chars().count(),
        ),
        Err(_) => (
            bytes
                .iter()
                .filter(|&&b| !(b.is_ascii_graphic() || b.is_ascii_whitespace()))
                .count(),
            bytes.len(),
        ),
    };
    odd as f64 / total as f64 >= BINARY_RATIO
}

fn is_readable(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let has_letters = text.chars().any(char::is_alphabetic);
    let has_separators = text
        .chars()
        .any(|c| c.is_whitespace() || ".,;:?!-()[]{}\"'".contains(c));
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    has_letters && has_separators && printable as f64 / total as f64 >= READABLE_RATIO
}

/// Readable decoding of a span's raw text, truncated for reporting.
pub fn decode_preview(kind: EncodingKind, raw: &str) -> Option<String> {
    let bytes = decode_bytes(kind, raw)?;
    let text = String::from_utf8(bytes).ok()?;
    if !is_readable(&text) {
        return None;
    }
    Some(crate::model::truncate_sample(&text, PREVIEW_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_preview() {
        let preview = decode_preview(EncodingKind::Base64, "SGVsbG8sIHdvcmxkIQ==");
        assert_eq!(preview.as_deref(), Some("Hello, world!"));
    }

    #[test]
    fn test_base64_fragment_decodes() {
        // Truncated inside a quantum, padding missing.
        assert!(decode_bytes(EncodingKind::Base64, "SGVsbG8sIHdvcmxkI").is_some());
    }

    #[test]
    fn test_hex_preview() {
        let preview = decode_preview(EncodingKind::Hex, "68656c6c6f2c20776f726c64");
        assert_eq!(preview.as_deref(), Some("hello, world"));
    }

    #[test]
    fn test_url_preview() {
        let preview = decode_preview(EncodingKind::UrlEncoded, "%3Cscript%3Ealert(1)%3C%2Fscript%3E");
        assert_eq!(preview.as_deref(), Some("<script>alert(1)</script>"));
    }

    #[test]
    fn test_unicode_escape_preview() {
        let preview = decode_preview(EncodingKind::UnicodeEscape, "\\u0068\\u0069\\u0020\\u0021");
        assert_eq!(preview.as_deref(), Some("hi !"));
    }

    #[test]
    fn test_binary_digits_decode() {
        let bytes = decode_bytes(EncodingKind::Binary, "0100100001101001").unwrap();
        assert_eq!(bytes, b"Hi");
    }

    #[test]
    fn test_high_entropy_has_no_preview() {
        assert_eq!(decode_preview(EncodingKind::HighEntropy, "x9$Kq!z"), None);
    }

    #[test]
    fn test_looks_binary() {
        assert!(looks_binary(&[0x00, 0x01, 0xff, 0xfe, 0x10, 0x80]));
        assert!(!looks_binary(b"plain old text"));
        assert!(!looks_binary(&[]));
    }
}
