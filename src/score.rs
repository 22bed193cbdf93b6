//! Suspicion scoring shared by the chunk analyzer and the aggregator.
//!
//! Both scores land in [0, 1] and are pure functions of their inputs, so the
//! same findings always produce the same numbers.

use crate::model::{ChunkAnalysis, EncodedSpan, EncodingKind};

const CHUNK_COVERAGE_WEIGHT: f64 = 0.45;
const CHUNK_CONFIDENCE_WEIGHT: f64 = 0.40;
const CHUNK_DIVERSITY_WEIGHT: f64 = 0.15;

/// Coverage at which the coverage term saturates is `1 / COVERAGE_GAIN`.
const COVERAGE_GAIN: f64 = 4.0;

/// Distinct kinds at which the diversity term saturates.
const DIVERSITY_SATURATION: f64 = 3.0;

const DOC_MAX_WEIGHT: f64 = 0.5;
const DOC_MEAN_WEIGHT: f64 = 0.3;
const DOC_DENSITY_WEIGHT: f64 = 0.2;

/// Spans per 1000 bytes above which density is reported.
const DENSITY_REASON_LIMIT: f64 = 0.5;

/// Confidence above which a span counts as high-confidence.
const HIGH_CONFIDENCE: f64 = 0.8;

/// Bytes covered by the union of `spans`.
pub fn covered_bytes(spans: &[EncodedSpan]) -> usize {
    let mut ranges: Vec<(usize, usize)> = spans.iter().map(|s| (s.offset, s.end())).collect();
    ranges.sort_unstable();

    let mut total = 0;
    let mut current: Option<(usize, usize)> = None;
    for (start, end) in ranges {
        match current {
            Some((cs, ce)) if start <= ce => current = Some((cs, ce.max(end))),
            Some((cs, ce)) => {
                total += ce - cs;
                current = Some((start, end));
            }
            None => current = Some((start, end)),
        }
    }
    if let Some((cs, ce)) = current {
        total += ce - cs;
    }
    total
}

/// Score a chunk from its spans and text length.
///
/// Combines how much of the text is flagged, the strongest single finding,
/// and how many different encodings were seen. No spans scores 0.0.
pub fn chunk_score(spans: &[EncodedSpan], text_len: usize) -> f64 {
    if spans.is_empty() || text_len == 0 {
        return 0.0;
    }
    let coverage = covered_bytes(spans) as f64 / text_len as f64;
    let max_confidence = spans.iter().map(|s| s.confidence).fold(0.0, f64::max);
    let kinds = distinct_kinds(spans);

    let score = CHUNK_COVERAGE_WEIGHT * (coverage * COVERAGE_GAIN).min(1.0)
        + CHUNK_CONFIDENCE_WEIGHT * max_confidence
        + CHUNK_DIVERSITY_WEIGHT * (kinds as f64 / DIVERSITY_SATURATION).min(1.0);
    score.clamp(0.0, 1.0)
}

/// Score a document from its chunk results.
///
/// Failed chunks are unknown rather than clean and are left out entirely.
/// No valid chunk scores 0.0.
pub fn document_score(analyses: &[ChunkAnalysis]) -> f64 {
    let valid: Vec<(f64, &ChunkAnalysis)> = analyses
        .iter()
        .filter_map(|a| a.valid_score().map(|s| (s, a)))
        .collect();
    if valid.is_empty() {
        return 0.0;
    }

    let max_score = valid.iter().map(|(s, _)| *s).fold(0.0, f64::max);
    let total_len: usize = valid.iter().map(|(_, a)| a.text_len()).sum();
    let flagged: usize = valid.iter().map(|(_, a)| a.flagged_bytes).sum();

    let (mean, density) = if total_len == 0 {
        let mean = valid.iter().map(|(s, _)| *s).sum::<f64>() / valid.len() as f64;
        (mean, 0.0)
    } else {
        let weighted: f64 = valid.iter().map(|(s, a)| s * a.text_len() as f64).sum();
        (
            weighted / total_len as f64,
            flagged as f64 / total_len as f64,
        )
    };

    let score = DOC_MAX_WEIGHT * max_score
        + DOC_MEAN_WEIGHT * mean
        + DOC_DENSITY_WEIGHT * (density * COVERAGE_GAIN).min(1.0);
    score.clamp(0.0, 1.0)
}

fn distinct_kinds(spans: &[EncodedSpan]) -> usize {
    let mut kinds: Vec<EncodingKind> = spans.iter().map(|s| s.kind).collect();
    kinds.sort_unstable();
    kinds.dedup();
    kinds.len()
}

/// Human-readable explanations for a set of findings.
pub fn reasons(spans: &[EncodedSpan], text_len: usize) -> Vec<String> {
    let mut reasons = Vec::new();
    if spans.is_empty() || text_len == 0 {
        return reasons;
    }

    let density = spans.len() as f64 / (text_len as f64 / 1000.0);
    if density > DENSITY_REASON_LIMIT {
        reasons.push(format!(
            "High pattern density: {:.2} patterns per 1000 bytes",
            density
        ));
    }

    let high = spans.iter().filter(|s| s.confidence > HIGH_CONFIDENCE).count();
    if high >= 3 {
        reasons.push(format!("Multiple high-confidence patterns: {}", high));
    }

    let entropy = count_kind(spans, EncodingKind::HighEntropy);
    if entropy > 0 {
        reasons.push(format!("High entropy regions found: {}", entropy));
    }

    let base64 = count_kind(spans, EncodingKind::Base64);
    if base64 > 2 {
        reasons.push(format!("Multiple Base64 patterns: {}", base64));
    }

    let kinds = distinct_kinds(spans);
    if kinds >= 3 {
        reasons.push(format!("Mixed encodings: {} distinct kinds", kinds));
    }

    reasons
}

fn count_kind(spans: &[EncodedSpan], kind: EncodingKind) -> usize {
    spans.iter().filter(|s| s.kind == kind).count()
}
