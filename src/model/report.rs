//! Document-level report.

use super::{EncodedSpan, EncodingKind, Metadata, Table, VisualElement};
use crate::error::ChunkFailure;
use serde::{Deserialize, Serialize};

/// Final analysis result for a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    /// Document text, page contributions in page order
    pub text: String,

    /// All tables, in page order
    pub tables: Vec<Table>,

    /// All visual elements, in page order
    pub visual_elements: Vec<VisualElement>,

    /// Detected spans with document-global offsets, sorted by offset
    pub encoded_sections: Vec<EncodedSpan>,

    /// Suspicion score in [0, 1], computed from analyzed chunks only
    pub document_suspicion_score: f64,

    /// Chunks that produced no analysis
    pub chunk_failures: Vec<ChunkFailure>,

    /// Whether the score reached the configured threshold
    pub suspicious: bool,

    /// Why the document scored the way it did
    pub reasons: Vec<String>,

    /// Metadata passed through from the input document
    pub metadata: Metadata,

    /// Per-page offsets and counts
    pub pages: Vec<PageSummary>,

    /// Coverage statistics
    pub stats: ReportStats,
}

impl DocumentReport {
    /// Check if some chunks could not be analyzed.
    pub fn is_partial(&self) -> bool {
        !self.chunk_failures.is_empty()
    }

    /// Spans of a given kind.
    pub fn sections_of_kind(&self, kind: EncodingKind) -> impl Iterator<Item = &EncodedSpan> {
        self.encoded_sections.iter().filter(move |s| s.kind == kind)
    }

    /// Source page index containing a document offset.
    pub fn page_at(&self, offset: usize) -> Option<u32> {
        let pos = self.pages.partition_point(|p| p.offset + p.length <= offset);
        self.pages
            .get(pos)
            .filter(|p| p.offset <= offset && offset < p.offset + p.length)
            .map(|p| p.index)
    }

    /// Text covered by a span.
    pub fn span_text(&self, span: &EncodedSpan) -> Option<&str> {
        self.text.get(span.offset..span.end())
    }
}

/// Where a page sits in the report and what was found on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    /// Source page index
    pub index: u32,

    /// Offset of the page's text in the report text
    pub offset: usize,

    /// Length of the page's contribution in bytes
    pub length: usize,

    /// Encoded sections starting on this page
    pub encoded_sections: usize,

    /// Tables on this page
    pub tables: usize,

    /// Visual elements on this page
    pub visual_elements: usize,

    /// Layout oddities (rotation, image-only pages)
    pub formatting_flags: Vec<String>,
}

/// Coverage statistics for a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    /// Pages in the document
    pub page_count: usize,

    /// Chunks dispatched
    pub chunk_count: usize,

    /// Chunks that failed
    pub failed_chunks: usize,

    /// Text bytes in the document
    pub total_bytes: usize,

    /// Text bytes in successfully analyzed chunks
    pub analyzed_bytes: usize,

    /// Bytes covered by encoded sections in analyzed chunks
    pub flagged_bytes: usize,
}

impl ReportStats {
    /// Share of the document text that was analyzed.
    pub fn coverage(&self) -> f64 {
        if self.total_bytes == 0 {
            return if self.failed_chunks == 0 { 1.0 } else { 0.0 };
        }
        self.analyzed_bytes as f64 / self.total_bytes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(index: u32, offset: usize, length: usize) -> PageSummary {
        PageSummary {
            index,
            offset,
            length,
            encoded_sections: 0,
            tables: 0,
            visual_elements: 0,
            formatting_flags: Vec::new(),
        }
    }

    fn report_with_pages(pages: Vec<PageSummary>) -> DocumentReport {
        DocumentReport {
            text: "0123456789".to_string(),
            tables: Vec::new(),
            visual_elements: Vec::new(),
            encoded_sections: Vec::new(),
            document_suspicion_score: 0.0,
            chunk_failures: Vec::new(),
            suspicious: false,
            reasons: Vec::new(),
            metadata: Metadata::default(),
            pages,
            stats: ReportStats::default(),
        }
    }

    #[test]
    fn test_page_at_skips_empty_pages() {
        let report = report_with_pages(vec![summary(0, 0, 4), summary(1, 4, 0), summary(2, 4, 6)]);
        assert_eq!(report.page_at(0), Some(0));
        assert_eq!(report.page_at(3), Some(0));
        assert_eq!(report.page_at(4), Some(2));
        assert_eq!(report.page_at(9), Some(2));
        assert_eq!(report.page_at(10), None);
    }

    #[test]
    fn test_coverage() {
        let stats = ReportStats {
            total_bytes: 200,
            analyzed_bytes: 150,
            ..Default::default()
        };
        assert_eq!(stats.coverage(), 0.75);
        assert_eq!(ReportStats::default().coverage(), 1.0);
    }

    #[test]
    fn test_report_json_shape() {
        let report = report_with_pages(Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        for key in [
            "text",
            "tables",
            "visualElements",
            "encodedSections",
            "documentSuspicionScore",
            "chunkFailures",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
