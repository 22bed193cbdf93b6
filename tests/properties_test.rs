//! Property tests for chunking, windowing and scoring.

use proptest::prelude::*;

use pdfsift::chunk::sliding_windows;
use pdfsift::detect::{shannon_entropy, EntropyDetector};
use pdfsift::{analyze, split_document, AnalysisConfig, ChunkingOptions, Document};

fn page_texts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[ -~]{0,120}", 1..16)
}

proptest! {
    #[test]
    fn test_chunks_partition_document(texts in page_texts(), target in 1usize..6) {
        let doc = Document::from_texts(texts.clone());
        let chunks = split_document(&doc, &ChunkingOptions::pages(target)).unwrap();

        prop_assert_eq!(chunks[0].start_page, 0);
        prop_assert_eq!(chunks.last().unwrap().end_page, texts.len());
        for pair in chunks.windows(2) {
            prop_assert_eq!(pair[0].end_page, pair[1].start_page);
        }
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
            prop_assert!(chunk.page_count() >= 1);
            prop_assert!(chunk.page_count() <= target);
        }

        let rejoined: String = chunks.iter().map(|c| c.text()).collect();
        prop_assert_eq!(rejoined, doc.full_text());
    }

    #[test]
    fn test_byte_cap_respected(texts in page_texts(), cap in 40usize..400) {
        let doc = Document::from_texts(texts);
        let options = ChunkingOptions::pages(8).with_max_bytes(cap);
        for chunk in split_document(&doc, &options).unwrap() {
            prop_assert!(chunk.page_count() == 1 || chunk.text_len() <= cap);
        }
    }

    #[test]
    fn test_windows_cover_every_char(text in "\\PC{0,300}", size in 16usize..64, step_div in 1usize..4) {
        let step = (size / step_div).max(1);
        let windows = sliding_windows(&text, size, step);

        let mut covered = vec![false; text.len()];
        for window in &windows {
            prop_assert_eq!(&text[window.offset..window.offset + window.text.len()], window.text);
            prop_assert!(window.char_len() <= size);
            for b in window.offset..window.offset + window.text.len() {
                covered[b] = true;
            }
        }
        prop_assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn test_entropy_bounded_by_alphabet(text in "[a-z0-9]{1,200}") {
        let distinct = text.chars().collect::<std::collections::HashSet<_>>().len();
        let entropy = shannon_entropy(&text);
        prop_assert!(entropy >= 0.0);
        prop_assert!(entropy <= (distinct as f64).log2() + 1e-9);
    }

    #[test]
    fn test_entropy_grows_with_alphabet(n in 1usize..60, repeat in 1usize..5) {
        let alphabet: Vec<char> = ('!'..='~').take(n + 1).collect();
        let smaller: String = alphabet[..n].iter().cycle().take(n * repeat).collect();
        let larger: String = alphabet.iter().cycle().take((n + 1) * repeat).collect();
        prop_assert!(shannon_entropy(&larger) > shannon_entropy(&smaller));
    }

    #[test]
    fn test_entropy_confidence_monotone(a in 0.0f64..8.0, b in 0.0f64..8.0) {
        let detector = EntropyDetector::new(5.0, 5.9);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        match (detector.confidence(low), detector.confidence(high)) {
            (Some(c_low), Some(c_high)) => prop_assert!(c_low <= c_high),
            (Some(_), None) => prop_assert!(false, "confidence lost above threshold"),
            (None, _) => prop_assert!(low <= 5.0),
        }
        if high <= 5.0 {
            prop_assert!(detector.confidence(high).is_none());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_analysis_well_formed(texts in page_texts(), target in 1usize..4) {
        let doc = Document::from_texts(texts);
        let config = AnalysisConfig::default().with_chunk_pages(target).with_concurrency(2);
        let report = analyze(&doc, &config).unwrap();

        prop_assert!((0.0..=1.0).contains(&report.document_suspicion_score));
        prop_assert_eq!(&report.text, &doc.full_text());
        for pair in report.encoded_sections.windows(2) {
            prop_assert!(pair[0].offset <= pair[1].offset);
        }
        for section in &report.encoded_sections {
            prop_assert!(section.end() <= report.text.len());
            prop_assert!((0.0..=1.0).contains(&section.confidence));
        }
    }
}
