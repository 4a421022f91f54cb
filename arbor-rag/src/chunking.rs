//! Document chunking.
//!
//! Provides the [`Chunker`] trait and [`RecursiveChunker`], which splits
//! text into overlapping windows preferring paragraph, then sentence, then
//! word boundaries before falling back to a hard character cut.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings; embeddings are attached later by the index.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text. Each returned
    /// chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Boundary preference, coarsest first. Whitespace is the last resort
/// before a hard character cut.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// Splits text into overlapping windows at natural boundaries.
///
/// Segments are split with the separator kept attached to the preceding
/// segment, then greedily merged up to `chunk_size`. When a window closes,
/// the next one starts with the previous window's trailing `chunk_overlap`
/// characters, so retrieval never loses context at a window edge. Segments
/// that exceed `chunk_size` on their own are split again at the next finer
/// boundary.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — target number of characters per chunk
    /// * `chunk_overlap` — characters shared between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let windows =
            split_level(&document.text, self.chunk_size, self.chunk_overlap, &SEPARATORS);

        windows
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                Chunk {
                    id: format!("{}_{i}", document.id),
                    text,
                    embedding: Vec::new(),
                    metadata,
                    document_id: document.id.clone(),
                }
            })
            .collect()
    }
}

/// Split `text` at the coarsest separator that actually divides it, merging
/// the pieces back into windows of at most `size` characters. Falls through
/// to finer separators and finally to [`hard_cut`].
fn split_level(text: &str, size: usize, overlap: usize, separators: &[&str]) -> Vec<String> {
    if text.len() <= size {
        return vec![text.to_string()];
    }

    let Some((separator, finer)) = separators.split_first() else {
        return hard_cut(text, size, overlap);
    };

    let segments: Vec<&str> = text.split_inclusive(separator).collect();
    if segments.len() <= 1 {
        return split_level(text, size, overlap, finer);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if segment.len() > size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_level(segment, size, overlap, finer));
            continue;
        }

        if current.is_empty() {
            current = segment.to_string();
        } else if current.len() + segment.len() <= size {
            current.push_str(segment);
        } else {
            let tail = overlap_tail(&current, overlap);
            let next = if tail.len() + segment.len() <= size {
                format!("{tail}{segment}")
            } else {
                segment.to_string()
            };
            chunks.push(std::mem::replace(&mut current, next));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// The trailing `overlap` characters of `s`, adjusted to a char boundary.
fn overlap_tail(s: &str, overlap: usize) -> &str {
    if overlap == 0 {
        return "";
    }
    if s.len() <= overlap {
        return s;
    }
    let mut start = s.len() - overlap;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Character-count windows with overlap, for text with no usable boundary.
fn hard_cut(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + size).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end <= start {
            end = start + 1;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
            end = end.min(text.len());
        }
        chunks.push(text[start..end].to_string());

        if end == text.len() {
            break;
        }
        let mut next = start + step;
        while next < text.len() && !text.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn doc(text: &str) -> Document {
        Document { id: "doc".into(), text: text.into(), metadata: HashMap::new() }
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = RecursiveChunker::new(100, 20);
        assert!(chunker.chunk(&doc("")).is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = RecursiveChunker::new(100, 20);
        let chunks = chunker.chunk(&doc("just a short note"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "just a short note");
        assert_eq!(chunks[0].id, "doc_0");
        assert_eq!(chunks[0].metadata["chunk_index"], "0");
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = format!("{}\n\n{}", "first paragraph here", "second paragraph here");
        let chunker = RecursiveChunker::new(30, 0);
        let chunks = chunker.chunk(&doc(&text));
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.starts_with("first paragraph"));
        assert!(chunks[1].text.starts_with("second paragraph"));
    }

    #[test]
    fn windows_respect_the_size_bound() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let text = sentence.repeat(60);
        let chunker = RecursiveChunker::new(200, 40);
        for chunk in chunker.chunk(&doc(&text)) {
            assert!(chunk.text.len() <= 200, "chunk too long: {}", chunk.text.len());
        }
    }

    #[test]
    fn consecutive_windows_overlap() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let text = sentence.repeat(60);
        let chunker = RecursiveChunker::new(200, 40);
        let chunks = chunker.chunk(&doc(&text));
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].text.chars().rev().take(20).collect::<String>();
            let tail: String = tail.chars().rev().collect();
            assert!(
                pair[1].text.contains(&tail),
                "window does not carry overlap from its predecessor"
            );
        }
    }

    #[test]
    fn hard_cut_applies_overlap() {
        let text = "a".repeat(250);
        let chunks = hard_cut(&text, 100, 20);
        // Starts advance by size - overlap: 0, 80, 160.
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[1].len(), 100);
        assert_eq!(chunks[2].len(), 250 - 160);
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let text = "é".repeat(300);
        let chunker = RecursiveChunker::new(100, 20);
        let chunks = chunker.chunk(&doc(&text));
        assert!(!chunks.is_empty());
        for chunk in chunks {
            assert!(chunk.text.chars().all(|c| c == 'é'));
        }
    }

    #[test]
    fn oversized_paragraph_falls_through_to_sentences() {
        let text = format!(
            "{}\n\n{}",
            "One sentence. Two sentence. Three sentence. Four sentence.",
            "tail"
        );
        let chunker = RecursiveChunker::new(30, 0);
        let chunks = chunker.chunk(&doc(&text));
        assert!(chunks.len() > 2);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 30);
        }
    }
}
