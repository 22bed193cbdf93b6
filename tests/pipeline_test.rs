//! End-to-end tests for the analysis pipeline.

use pdfsift::render::{to_json, JsonFormat};
use pdfsift::{
    analyze, analyze_file, load_request, split_document, AnalysisConfig, ChunkingOptions,
    Document, EncodingKind, FailureKind, Page, Sift,
};

// "Hello, world! Hidden payload"
const PAYLOAD: &str = "SGVsbG8sIHdvcmxkISBIaWRkZW4gcGF5bG9hZA==";

fn sample_document(pages: usize) -> Document {
    Document::from_texts((0..pages).map(|i| {
        format!(
            "Page {} of the quarterly report. Revenue grew in every region.",
            i + 1
        )
    }))
}

#[test]
fn test_report_text_matches_document() {
    let doc = sample_document(7);
    for pages in [1, 2, 3, 7, 10] {
        let config = AnalysisConfig::default().with_chunk_pages(pages);
        let report = analyze(&doc, &config).unwrap();
        assert_eq!(report.text, doc.full_text());
        assert_eq!(report.stats.page_count, 7);
        assert_eq!(report.stats.total_bytes, doc.full_text().len());
    }
}

#[test]
fn test_chunks_partition_pages() {
    let doc = sample_document(11);
    let chunks = split_document(&doc, &ChunkingOptions::pages(4)).unwrap();

    let ranges: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start_page, c.end_page)).collect();
    assert_eq!(ranges, vec![(0, 4), (4, 8), (8, 11)]);

    let rejoined: String = chunks.iter().map(|c| c.text()).collect();
    assert_eq!(rejoined, doc.full_text());
}

#[test]
fn test_clean_document_not_flagged() {
    let report = analyze(&sample_document(4), &AnalysisConfig::default()).unwrap();
    assert!(!report.suspicious);
    assert!(report.encoded_sections.is_empty());
    assert!(report.chunk_failures.is_empty());
    assert_eq!(report.document_suspicion_score, 0.0);
}

#[test]
fn test_payload_located_on_its_page() {
    let doc = Document::from_texts([
        "Cover letter".to_string(),
        "Terms and conditions apply.".to_string(),
        format!("Reference: {}", PAYLOAD),
    ]);
    let config = AnalysisConfig::default().with_chunk_pages(1);
    let report = analyze(&doc, &config).unwrap();

    let sections: Vec<_> = report.sections_of_kind(EncodingKind::Base64).collect();
    assert_eq!(sections.len(), 1);
    assert_eq!(report.span_text(sections[0]), Some(PAYLOAD));
    assert_eq!(report.page_at(sections[0].offset), Some(2));
    assert_eq!(
        sections[0].decoded_preview.as_deref(),
        Some("Hello, world! Hidden payload")
    );

    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.pages[2].encoded_sections, 1);
    assert_eq!(report.pages[0].encoded_sections, 0);
}

#[test]
fn test_run_split_across_chunks_is_joined() {
    let doc = Document::from_texts([format!("intro {}", PAYLOAD), format!("{} outro", PAYLOAD)]);
    let config = AnalysisConfig::default().with_chunk_pages(1);
    let report = analyze(&doc, &config).unwrap();

    assert_eq!(report.stats.chunk_count, 2);
    let sections: Vec<_> = report.sections_of_kind(EncodingKind::Base64).collect();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].offset, 6);
    assert_eq!(sections[0].length, 81);
}

#[test]
fn test_unaligned_run_split_across_chunks_is_found() {
    // "Invoice macro: run stage2 at midnight", cut after 22 of 52 characters.
    let encoded = "SW52b2ljZSBtYWNybzogcnVuIHN0YWdlMiBhdCBtaWRuaWdodA==";
    let (head, tail) = encoded.split_at(22);
    let doc = Document::from_texts([
        format!("account summary {}", head),
        format!("{} end of notes", tail),
    ]);
    let config = AnalysisConfig::default().with_chunk_pages(1);
    let report = analyze(&doc, &config).unwrap();

    assert_eq!(report.stats.chunk_count, 2);
    let sections: Vec<_> = report.sections_of_kind(EncodingKind::Base64).collect();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].offset, 16);
    assert_eq!(sections[0].length, 53);
    assert_eq!(
        sections[0].decoded_preview.as_deref(),
        Some("Invoice macro: run stage2 at midnight")
    );
}

#[test]
fn test_same_report_for_any_concurrency() {
    let mut pages: Vec<String> = (0..9).map(|i| format!("ordinary page {}", i)).collect();
    pages[3] = format!("stash {}", PAYLOAD);
    pages[7] = "digest 0a1b2c3d4e5f60718293a4b5c6d7e8f9 end".to_string();
    let doc = Document::from_texts(pages);

    let render = |workers: usize| {
        let config = AnalysisConfig::default()
            .with_chunk_pages(2)
            .with_concurrency(workers);
        to_json(&analyze(&doc, &config).unwrap(), JsonFormat::Compact).unwrap()
    };

    let single = render(1);
    assert_eq!(single, render(4));
    assert_eq!(single, render(16));
    assert_eq!(single, render(1));
}

#[test]
fn test_blank_page_chunk_reported_not_fatal() {
    let doc = Document::from_pages([
        Page::new(0, "first page"),
        Page::new(1, "   "),
        Page::new(2, format!("last page {}", PAYLOAD)),
    ]);
    let report = Sift::new().chunk_pages(1).analyze(&doc).unwrap();

    assert!(report.is_partial());
    assert_eq!(report.chunk_failures.len(), 1);
    assert_eq!(report.chunk_failures[0].chunk_index, 1);
    assert_eq!(report.chunk_failures[0].kind, FailureKind::EmptyChunkText);
    assert_eq!(report.sections_of_kind(EncodingKind::Base64).count(), 1);
    assert!(report
        .reasons
        .iter()
        .any(|r| r == "1 of 3 chunks could not be analyzed"));
}

#[test]
fn test_empty_document_rejected() {
    let err = analyze(&Document::new(), &AnalysisConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Document has no pages");
}

#[test]
fn test_invalid_config_rejected() {
    let config = AnalysisConfig::default().with_concurrency(0);
    assert!(analyze(&sample_document(1), &config).is_err());
}

#[test]
fn test_load_request_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("request.json");
    let json = format!(
        r#"{{ "document": {{ "metadata": {{ "title": "Invoice" }},
                             "pages": [ {{ "index": 0, "text": "pay {}" }} ] }},
            "config": {{ "suspicionThreshold": 0.1 }} }}"#,
        PAYLOAD
    );
    std::fs::write(&path, json).unwrap();

    let request = load_request(&path).unwrap();
    assert_eq!(request.config.suspicion_threshold, 0.1);
    assert_eq!(request.document.metadata.title.as_deref(), Some("Invoice"));

    let report = analyze_file(&path).unwrap();
    assert_eq!(report.metadata.title.as_deref(), Some("Invoice"));
    assert_eq!(report.sections_of_kind(EncodingKind::Base64).count(), 1);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = analyze_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, pdfsift::Error::Io(_)));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_analyze_file_async() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("document.json");
    std::fs::write(&path, r#"{ "pages": [ { "index": 0, "text": "plain" } ] }"#).unwrap();

    let report = pdfsift::analyze_file_async(&path).await.unwrap();
    assert_eq!(report.text, "plain\n");
    assert!(!report.suspicious);
}
