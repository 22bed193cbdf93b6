//! Percent-encoding detector.

use regex::Regex;

use super::{Candidate, Detector, Window};
use crate::model::EncodingKind;

/// Minimum `%XX` escapes in a run.
const MIN_ESCAPES: usize = 3;

/// Escape count that earns the extra confidence bonus.
const MANY_ESCAPES: usize = 8;

/// Detects URL-token runs dense with `%XX` escapes.
#[derive(Debug, Clone)]
pub struct UrlEncodingDetector {
    density_threshold: f64,
    token_regex: Regex,
}

impl UrlEncodingDetector {
    /// Create a detector requiring at least `density_threshold` of a run's
    /// bytes to be part of escape triples.
    pub fn new(density_threshold: f64) -> Self {
        Self {
            density_threshold,
            token_regex: Regex::new(r"(?:%[0-9A-Fa-f]{2}|[A-Za-z0-9\-._~])+").unwrap(),
        }
    }

    fn score(&self, run: &str) -> Option<f64> {
        let escapes = count_escapes(run);
        if escapes < MIN_ESCAPES {
            return None;
        }
        let density = (escapes * 3) as f64 / run.len() as f64;
        if density < self.density_threshold {
            return None;
        }
        let mut confidence = 0.5 + 0.4 * density;
        if escapes >= MANY_ESCAPES {
            confidence += 0.05;
        }
        Some(confidence.min(0.95))
    }
}

fn count_escapes(run: &str) -> usize {
    run.bytes().filter(|&b| b == b'%').count()
}

impl Detector for UrlEncodingDetector {
    fn kind(&self) -> EncodingKind {
        EncodingKind::UrlEncoded
    }

    fn detect(&self, window: &Window<'_>) -> Vec<Candidate> {
        self.token_regex
            .find_iter(window.text)
            .filter_map(|m| {
                self.score(m.as_str())
                    .map(|c| Candidate::new(EncodingKind::UrlEncoded, m.start(), m.len(), c))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> UrlEncodingDetector {
        UrlEncodingDetector::new(0.3)
    }

    #[test]
    fn test_script_payload_flagged() {
        let run = "%3Cscript%3Ealert%281%29%3C%2Fscript%3E";
        let text = format!("q={} end", run);
        let found = detector().detect(&Window::whole(&text));
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0].start..found[0].end()], run);
        let expected = 0.5 + 0.4 * (21.0 / 39.0);
        assert!((found[0].confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_escapes_ignored() {
        let text = "a_rather_long_file_name%20with%20two%20spaces_in_it.pdf";
        assert!(detector().detect(&Window::whole(text)).is_empty());
    }

    #[test]
    fn test_too_few_escapes_ignored() {
        assert!(detector().detect(&Window::whole("%41%42")).is_empty());
    }

    #[test]
    fn test_fully_escaped_run_bonus() {
        let text = "%48%65%6C%6C%6F%20%77%6F%72%6C%64";
        let found = detector().detect(&Window::whole(text));
        assert_eq!(found.len(), 1);
        assert!((found[0].confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_bare_percent_breaks_run() {
        let text = "50% off %2 and %zz";
        assert!(detector().detect(&Window::whole(text)).is_empty());
    }
}
