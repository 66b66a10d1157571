//! Fixed-window text chunker.
//!
//! Splits extracted text into sequential windows of `window` characters
//! with no overlap. The last window may be shorter. Each window becomes an
//! independent [`DocumentRecord`] sharing the parent source URL and tagged
//! with its position as `chunk_id`.
//!
//! # Example
//!
//! ```rust
//! use research_harness_core::chunk::chunk_text;
//!
//! let text = "a".repeat(2500);
//! let lens: Vec<usize> = chunk_text(&text, 1000).iter().map(|c| c.chars().count()).collect();
//! assert_eq!(lens, vec![1000, 1000, 500]);
//! ```

use crate::models::{DocumentMetadata, DocumentRecord};

/// Window size used for PDF text.
pub const PDF_CHUNK_CHARS: usize = 1000;

/// Split `text` into consecutive windows of at most `window` characters.
///
/// Empty input yields no chunks. A `window` of zero is treated as one.
pub fn chunk_text(text: &str, window: usize) -> Vec<&str> {
    let window = window.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == window {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Chunk a PDF's text and wrap every window as a `pdf` document record.
pub fn pdf_documents(text: &str, source_url: &str, window: usize) -> Vec<DocumentRecord> {
    chunk_text(text, window)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| DocumentRecord {
            content: chunk.to_string(),
            metadata: DocumentMetadata {
                source: source_url.to_string(),
                doc_type: "pdf".to_string(),
                title: None,
                chunk_id: Some(i),
            },
        })
        .collect()
}
