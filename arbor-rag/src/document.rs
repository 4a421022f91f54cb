//! Data types for documents, chunks, search results, and answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing extracted text and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (the collection key).
    pub id: String,
    /// The extracted text content.
    pub text: String,
    /// Key-value metadata, e.g. the original file name under `source`.
    pub metadata: HashMap<String, String>,
}

/// A bounded, overlapping window of a [`Document`]'s text — the unit of
/// embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus `chunk_index`.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The relevance score (higher is more relevant).
    pub score: f32,
}

/// Provenance for one kept chunk, surfaced to the caller alongside the
/// answer. Not used in further computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceExcerpt {
    /// Truncated preview of the chunk text.
    pub preview: String,
    /// The chunk's original metadata.
    pub metadata: HashMap<String, String>,
}

/// The outcome of a document query: the generated answer plus supporting
/// excerpts in rank order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentAnswer {
    /// The generated (or fixed fallback) answer text.
    pub answer: String,
    /// Supporting excerpts, highest-ranked first.
    pub sources: Vec<SourceExcerpt>,
}
