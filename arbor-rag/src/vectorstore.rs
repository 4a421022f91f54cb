//! Vector store trait.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A nearest-neighbor store of embedded chunks, organized into named
/// collections (one per ingested document).
///
/// Collections are never deleted automatically; a previously created
/// collection can be activated again by name without re-ingesting.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// List the names of all collections.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Whether a collection with this name exists.
    ///
    /// The default implementation scans [`list_collections`]
    /// (VectorStore::list_collections); backends with a cheaper membership
    /// check should override it.
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_collections().await?.iter().any(|n| n == name))
    }

    /// Upsert chunks into a collection. Chunks must have embeddings set.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` chunks most similar to the given embedding.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
