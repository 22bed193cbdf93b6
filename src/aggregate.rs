//! Merging per-chunk analyses into a document report.

use std::collections::HashMap;

use crate::chunk::ChunkBounds;
use crate::config::AnalysisConfig;
use crate::detect::decode_preview;
use crate::error::{Error, Result};
use crate::model::{
    truncate_sample, ChunkAnalysis, Document, DocumentReport, EncodedSpan, EncodingKind, Metadata,
    Page, PageSummary, ReportStats,
};
use crate::score;

/// Merge chunk analyses into a single report.
///
/// `results` may arrive in any order but must match `bounds` one-to-one.
/// Offsets are rebased onto the concatenated document text, spans of the same
/// kind that meet across a chunk boundary are joined, and the document score
/// is computed from the chunks that were analyzed successfully. The returned
/// report has no page summaries; see [`aggregate_document`].
pub fn aggregate(
    bounds: &[ChunkBounds],
    mut results: Vec<ChunkAnalysis>,
    config: &AnalysisConfig,
    metadata: Metadata,
) -> Result<DocumentReport> {
    let mut bounds = bounds.to_vec();
    bounds.sort_by_key(|b| b.index);
    results.sort_by_key(|a| a.chunk_index);
    check_alignment(&bounds, &results)?;

    let total_bytes: usize = results.iter().map(ChunkAnalysis::text_len).sum();
    let mut text = String::with_capacity(total_bytes);
    let mut tables = Vec::new();
    let mut visual_elements = Vec::new();
    let mut sections: Vec<EncodedSpan> = Vec::new();
    let mut merged: Vec<usize> = Vec::new();
    let mut last_by_kind: HashMap<EncodingKind, usize> = HashMap::new();
    let mut previous: Option<(usize, bool)> = None;

    for analysis in &results {
        let base = text.len();
        text.push_str(&analysis.text);
        tables.extend(analysis.tables.iter().cloned());
        visual_elements.extend(analysis.visual_elements.iter().cloned());

        if analysis.is_ok() {
            let mut joined_kinds: Vec<EncodingKind> = Vec::new();
            for span in &analysis.encoded_spans {
                let span = span.shifted(base);
                let target = match previous {
                    Some((prev_base, true)) if !joined_kinds.contains(&span.kind) => {
                        joined_kinds.push(span.kind);
                        last_by_kind.get(&span.kind).copied().filter(|&i| {
                            let last = &sections[i];
                            last.end() >= prev_base
                                && span.offset.saturating_sub(last.end()) <= config.boundary_merge_gap
                        })
                    }
                    _ => None,
                };
                match target {
                    Some(i) => {
                        log::debug!(
                            "joining {} span across chunk boundary at offset {}",
                            span.kind,
                            base
                        );
                        sections[i].absorb(&span);
                        merged.push(i);
                    }
                    None => {
                        last_by_kind.insert(span.kind, sections.len());
                        sections.push(span);
                    }
                }
            }
        }
        previous = Some((base, analysis.is_ok()));
    }

    // Joined spans now cover text from two chunks.
    merged.sort_unstable();
    merged.dedup();
    for i in merged {
        let span = &mut sections[i];
        let raw = &text[span.offset..span.end()];
        span.sample = truncate_sample(raw, config.sample_len);
        // Page terminators between the halves are not part of the payload.
        let joined: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        span.decoded_preview = decode_preview(span.kind, &joined);
    }
    sections.sort_by_key(|s| (s.offset, s.kind));

    let chunk_failures: Vec<_> = results.iter().filter_map(|a| a.error.clone()).collect();
    let analyzed_bytes: usize = results
        .iter()
        .filter(|a| a.is_ok())
        .map(ChunkAnalysis::text_len)
        .sum();
    let flagged_bytes: usize = results
        .iter()
        .filter(|a| a.is_ok())
        .map(|a| a.flagged_bytes)
        .sum();

    let document_suspicion_score = score::document_score(&results);
    let suspicious = document_suspicion_score >= config.suspicion_threshold;

    let mut reasons = score::reasons(&sections, analyzed_bytes);
    if !chunk_failures.is_empty() {
        reasons.push(format!(
            "{} of {} chunks could not be analyzed",
            chunk_failures.len(),
            results.len()
        ));
    }

    let stats = ReportStats {
        page_count: bounds.last().map_or(0, |b| b.end_page),
        chunk_count: results.len(),
        failed_chunks: chunk_failures.len(),
        total_bytes,
        analyzed_bytes,
        flagged_bytes,
    };

    log::debug!(
        "aggregated {} chunks: {} sections, score {:.3}, {} failures",
        stats.chunk_count,
        sections.len(),
        document_suspicion_score,
        stats.failed_chunks
    );

    Ok(DocumentReport {
        text,
        tables,
        visual_elements,
        encoded_sections: sections,
        document_suspicion_score,
        chunk_failures,
        suspicious,
        reasons,
        metadata,
        pages: Vec::new(),
        stats,
    })
}

/// Aggregate and attach per-page summaries for the source document.
pub fn aggregate_document(
    document: &Document,
    bounds: &[ChunkBounds],
    results: Vec<ChunkAnalysis>,
    config: &AnalysisConfig,
) -> Result<DocumentReport> {
    let mut report = aggregate(bounds, results, config, document.metadata.clone())?;
    report.pages = page_summaries(&document.pages, &report.encoded_sections);
    Ok(report)
}

/// Locate each page in the document text and count what was found on it.
pub fn page_summaries(pages: &[Page], sections: &[EncodedSpan]) -> Vec<PageSummary> {
    let mut offset = 0;
    pages
        .iter()
        .map(|page| {
            let length = page.contribution_len();
            let start = offset;
            offset += length;
            PageSummary {
                index: page.index,
                offset: start,
                length,
                encoded_sections: sections
                    .iter()
                    .filter(|s| s.offset >= start && s.offset < start + length)
                    .count(),
                tables: page.tables.len(),
                visual_elements: page.visual_elements.len(),
                formatting_flags: page.formatting_flags(),
            }
        })
        .collect()
}

fn check_alignment(bounds: &[ChunkBounds], results: &[ChunkAnalysis]) -> Result<()> {
    if bounds.len() != results.len() {
        return Err(Error::Aggregation(format!(
            "expected {} chunk results, got {}",
            bounds.len(),
            results.len()
        )));
    }
    for (bound, result) in bounds.iter().zip(results) {
        if bound.index != result.chunk_index
            || bound.start_page != result.start_page
            || bound.end_page != result.end_page
        {
            return Err(Error::Aggregation(format!(
                "result for chunk {} (pages {}..{}) does not match chunk {} (pages {}..{})",
                result.chunk_index,
                result.start_page,
                result.end_page,
                bound.index,
                bound.start_page,
                bound.end_page
            )));
        }
    }
    Ok(())
}
