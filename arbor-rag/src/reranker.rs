//! Second-pass relevance scoring of retrieved chunks.

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::Result;

/// A reranker that re-scores and reorders search results.
///
/// Embedding similarity is a coarse recall filter; implementations of this
/// trait score (query, chunk-text) pairs with a finer-grained model to
/// sharpen precision on the final context window. Cross-encoder backends
/// plug in here.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank search results given the original query.
    ///
    /// Returns results ordered by descending relevance, with scores
    /// replaced by the reranker's own.
    async fn rerank(&self, query: &str, results: Vec<SearchResult>) -> Result<Vec<SearchResult>>;
}

/// Minimum query-term length considered by [`LexicalReranker`]; shorter
/// terms are stop-word noise.
const MIN_TERM_LEN: usize = 4;

/// A deterministic reranker scoring query-term overlap.
///
/// Each result's score becomes the fraction of distinct query terms (of at
/// least [`MIN_TERM_LEN`] characters, case-insensitive) that occur in the
/// chunk text. Ties keep their retrieval order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalReranker;

#[async_trait]
impl Reranker for LexicalReranker {
    async fn rerank(
        &self,
        query: &str,
        mut results: Vec<SearchResult>,
    ) -> Result<Vec<SearchResult>> {
        let mut terms: Vec<String> = query
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_TERM_LEN)
            .map(|w| w.to_lowercase())
            .collect();
        terms.sort();
        terms.dedup();

        for result in &mut results {
            let text = result.chunk.text.to_lowercase();
            let matched = terms.iter().filter(|term| text.contains(term.as_str())).count();
            result.score = if terms.is_empty() {
                0.0
            } else {
                matched as f32 / terms.len() as f32
            };
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(results)
    }
}
