//! Plain text summary of an analysis report.

use std::fmt::Write;

use crate::model::DocumentReport;

/// Render a short human-readable summary of a report.
///
/// Lists the verdict, coverage, reasons, each encoded section with its page,
/// and any chunks that could not be analyzed.
pub fn to_summary(report: &DocumentReport) -> String {
    let mut out = String::new();

    let verdict = if report.suspicious {
        "SUSPICIOUS"
    } else {
        "clean"
    };
    let _ = writeln!(
        out,
        "Verdict: {} (score {:.3})",
        verdict, report.document_suspicion_score
    );

    if let Some(title) = &report.metadata.title {
        let _ = writeln!(out, "Title: {}", title);
    }

    let stats = &report.stats;
    let _ = writeln!(
        out,
        "Pages: {}, chunks: {} ({} failed), analyzed {:.1}% of {} bytes",
        stats.page_count,
        stats.chunk_count,
        stats.failed_chunks,
        stats.coverage() * 100.0,
        stats.total_bytes
    );

    if !report.reasons.is_empty() {
        out.push_str("\nReasons:\n");
        for reason in &report.reasons {
            let _ = writeln!(out, "  - {}", reason);
        }
    }

    if !report.encoded_sections.is_empty() {
        let _ = writeln!(out, "\nEncoded sections ({}):", report.encoded_sections.len());
        for section in &report.encoded_sections {
            let page = report
                .page_at(section.offset)
                .map(|p| format!("page {}", p))
                .unwrap_or_else(|| "page ?".to_string());
            let _ = writeln!(
                out,
                "  [{}] {} at {}+{} ({:.2}): {}",
                page,
                section.kind,
                section.offset,
                section.length,
                section.confidence,
                section.sample
            );
            if let Some(preview) = &section.decoded_preview {
                let _ = writeln!(out, "      decodes to: {}", preview);
            }
        }
    }

    if !report.chunk_failures.is_empty() {
        let _ = writeln!(out, "\nFailed chunks ({}):", report.chunk_failures.len());
        for failure in &report.chunk_failures {
            let _ = writeln!(
                out,
                "  chunk {}: {} - {}",
                failure.chunk_index, failure.kind, failure.message
            );
        }
    }

    out
}
