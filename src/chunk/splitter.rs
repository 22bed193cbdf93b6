//! Page-aligned document splitting.

use super::Chunk;
use crate::config::ChunkingOptions;
use crate::error::{Error, Result};
use crate::model::Document;

/// Split a document into chunks of whole pages.
///
/// A chunk closes when it holds `target_pages` pages, or when `max_bytes` is
/// set and the next page's text would push it past the cap. A page larger
/// than the cap forms a chunk on its own. Chunks cover every page exactly
/// once, in order.
pub fn split_document(document: &Document, options: &ChunkingOptions) -> Result<Vec<Chunk>> {
    if options.target_pages == 0 {
        return Err(Error::InvalidConfiguration(
            "chunk target pages must be positive".to_string(),
        ));
    }
    if options.max_bytes == Some(0) {
        return Err(Error::InvalidConfiguration(
            "chunk byte cap must be positive".to_string(),
        ));
    }
    if document.is_empty() {
        return Err(Error::EmptyDocument);
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current = Vec::new();
    let mut current_bytes = 0usize;

    for (position, page) in document.pages.iter().enumerate() {
        let page_bytes = page.contribution_len();
        let over_cap = options
            .max_bytes
            .is_some_and(|cap| current_bytes + page_bytes > cap);

        if !current.is_empty() && (current.len() >= options.target_pages || over_cap) {
            chunks.push(Chunk::new(chunks.len(), start, std::mem::take(&mut current)));
            start = position;
            current_bytes = 0;
        }

        current.push(page.clone());
        current_bytes += page_bytes;
    }
    chunks.push(Chunk::new(chunks.len(), start, current));

    let count = chunks.len();
    let chunks: Vec<Chunk> = chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| chunk.with_neighbors(i > 0, i + 1 < count))
        .collect();

    log::debug!(
        "split {} pages into {} chunks (target {} pages, cap {:?} bytes)",
        document.page_count(),
        chunks.len(),
        options.target_pages,
        options.max_bytes
    );

    Ok(chunks)
}
