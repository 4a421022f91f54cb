//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps each collection as an insertion-ordered
//! chunk list behind a `tokio::sync::RwLock`. Suitable for development,
//! testing, and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// One collection: declared dimensionality plus chunks in insertion order.
#[derive(Debug, Default)]
struct Collection {
    dimensions: usize,
    chunks: Vec<Chunk>,
}

/// An in-memory [`VectorStore`] using cosine similarity for search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn backend_error(message: impl Into<String>) -> RagError {
    RagError::VectorStore { backend: "InMemory".to_string(), message: message.into() }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, chunks: Vec::new() });
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(collections.keys().cloned().collect())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self.collections.read().await;
        Ok(collections.contains_key(name))
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| backend_error(format!("collection '{collection}' does not exist")))?;

        for chunk in chunks {
            if chunk.embedding.len() != stored.dimensions {
                return Err(backend_error(format!(
                    "chunk '{}' has {} dimensions, collection '{collection}' expects {}",
                    chunk.id,
                    chunk.embedding.len(),
                    stored.dimensions
                )));
            }
            match stored.chunks.iter_mut().find(|c| c.id == chunk.id) {
                Some(existing) => *existing = chunk.clone(),
                None => stored.chunks.push(chunk.clone()),
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| backend_error(format!("collection '{collection}' does not exist")))?;

        let mut scored: Vec<SearchResult> = stored
            .chunks
            .iter()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
