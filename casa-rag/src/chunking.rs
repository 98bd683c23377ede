//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`OverlapChunker`], which
//! splits text into bounded windows that share a configurable overlap with
//! their neighbour so context is not lost at a boundary.

use crate::document::{Chunk, Document};

/// Break candidates tried from most to least preferred when ending a chunk.
const SEPARATORS: &[&str] = &["\n\n", ". ", "! ", "? ", " "];

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with deterministic IDs; embeddings are
/// attached later by the ingestion pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into ordered chunks.
    ///
    /// Returns an empty `Vec` if the document text is empty or whitespace.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into windows of at most `max_chars` bytes, where each window
/// begins `overlap` bytes before the end of the previous one.
///
/// Cuts prefer natural boundaries (paragraph break, sentence end, word
/// break) found in the back half of the window, falling back to a hard cut.
/// Boundary preference is a quality heuristic; every chunk is an exact
/// substring of the trimmed document text and no UTF-8 code point is ever
/// split.
///
/// # Example
///
/// ```rust,ignore
/// use casa_rag::OverlapChunker;
///
/// let chunker = OverlapChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct OverlapChunker {
    max_chars: usize,
    overlap: usize,
}

impl OverlapChunker {
    /// Create a new `OverlapChunker`.
    ///
    /// # Arguments
    ///
    /// * `max_chars` — maximum chunk size in bytes (characters for ASCII)
    /// * `overlap` — trailing bytes repeated at the start of the next chunk;
    ///   must be less than `max_chars` for the split to make progress
    pub fn new(max_chars: usize, overlap: usize) -> Self {
        Self { max_chars, overlap }
    }

    /// Choose where to end a chunk that starts at `start` and may extend to
    /// `hard` at most. Prefers the latest separator in the back half of the
    /// window; falls back to the hard cut.
    fn cut_point(&self, text: &str, start: usize, hard: usize) -> usize {
        let window = &text[start..hard];
        let floor = window.len() / 2;
        for separator in SEPARATORS {
            if let Some(pos) = window.rfind(separator) {
                let cut = pos + separator.len();
                if cut > floor {
                    return start + cut;
                }
            }
        }
        hard
    }
}

/// Largest index `<= at` that falls on a `char` boundary of `text`.
fn floor_char_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

/// Smallest index `>= at` that falls on a `char` boundary of `text`.
fn ceil_char_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while at < text.len() && !text.is_char_boundary(at) {
        at += 1;
    }
    at
}

impl Chunker for OverlapChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0;

        while start < text.len() {
            let end = if text.len() - start <= self.max_chars {
                text.len()
            } else {
                let hard = floor_char_boundary(text, start + self.max_chars);
                if hard <= start {
                    // max_chars is narrower than the next character; take the
                    // whole character rather than stalling.
                    ceil_char_boundary(text, start + 1)
                } else {
                    self.cut_point(text, start, hard)
                }
            };

            chunks.push(Chunk {
                id: Chunk::record_id(&document.name, index),
                source: document.name.clone(),
                index,
                text: text[start..end].to_string(),
                offset: start,
            });

            if end == text.len() {
                break;
            }
            index += 1;

            let next = floor_char_boundary(text, end.saturating_sub(self.overlap));
            // Overlap must never move the window backwards past the current
            // chunk's start or the split would stop making progress.
            start = if next > start { next } else { end };
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("doc.txt", "text/plain", text)
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = OverlapChunker::new(100, 20);
        assert!(chunker.chunk(&doc("")).is_empty());
        assert!(chunker.chunk(&doc("   \n\t ")).is_empty());
    }

    #[test]
    fn short_text_yields_one_trimmed_chunk() {
        let chunker = OverlapChunker::new(100, 20);
        let chunks = chunker.chunk(&doc("  hello world  "));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].id, "doc.txt-0");
        assert_eq!(chunks[0].offset, 0);
    }

    #[test]
    fn hard_cuts_on_unbroken_text() {
        let text = "a".repeat(2300);
        let chunker = OverlapChunker::new(1000, 200);
        let chunks = chunker.chunk(&doc(&text));

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text.len(), 1000);
        assert_eq!(chunks[1].text.len(), 1000);
        assert_eq!(chunks[2].text.len(), 700);
        assert_eq!(chunks[1].offset, 800);
        assert_eq!(chunks[2].offset, 1600);
    }

    #[test]
    fn prefers_sentence_boundaries() {
        let text = format!("{}. {}", "x".repeat(70), "y".repeat(60));
        let chunker = OverlapChunker::new(100, 10);
        let chunks = chunker.chunk(&doc(&text));

        // First cut lands after ". " instead of hard-cutting mid-word.
        assert!(chunks[0].text.ends_with(". "));
        assert_eq!(chunks[0].text.len(), 72);
    }

    #[test]
    fn never_splits_multibyte_characters() {
        let text = "é".repeat(50); // 2 bytes each
        let chunker = OverlapChunker::new(33, 7);
        let chunks = chunker.chunk(&doc(&text));

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().all(|c| c == 'é'));
        }
    }

    #[test]
    fn degenerate_overlap_still_makes_progress() {
        // A cut snapped to a boundary early in the window could otherwise
        // land the next start at or before the current one.
        let text = format!("ab. {}", "c".repeat(30));
        let chunker = OverlapChunker::new(10, 9);
        let chunks = chunker.chunk(&doc(&text));

        for pair in chunks.windows(2) {
            assert!(pair[1].offset > pair[0].offset);
        }
        let last = chunks.last().unwrap();
        assert_eq!(last.offset + last.text.len(), text.trim().len());
    }
}
