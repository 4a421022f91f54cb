//! The document index: ingest, activate, and query.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use arbor_core::{ChatMessage, TextGenerator};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::{Document, DocumentAnswer, SearchResult, SourceExcerpt};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::extract_text;
use crate::naming::collection_key;
use crate::reranker::{LexicalReranker, Reranker};
use crate::vectorstore::VectorStore;

/// Fixed answer when no collection is active. Not an error.
pub const NO_DOCUMENT_ANSWER: &str = "No PDF loaded. Please upload a PDF first.";

/// Fixed answer when retrieval finds no candidates.
pub const NO_MATCHES_ANSWER: &str = "No relevant information found in the document.";

/// System instruction for grounded question answering.
const QA_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the following context to answer \
                                the question. If the context doesn't contain relevant \
                                information, say so.";

/// The currently active collection and the file name it was created from.
#[derive(Debug, Clone)]
struct ActiveCollection {
    collection: String,
    document_name: String,
}

/// Owns one vector collection per ingested document and answers questions
/// over the active one.
///
/// Construct via [`DocumentIndex::builder()`]. See the crate docs for the
/// retrieval design.
pub struct DocumentIndex {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    reranker: Arc<dyn Reranker>,
    generator: Arc<dyn TextGenerator>,
    active: RwLock<Option<ActiveCollection>>,
}

impl DocumentIndex {
    /// Create a new [`DocumentIndexBuilder`].
    pub fn builder() -> DocumentIndexBuilder {
        DocumentIndexBuilder::default()
    }

    /// Return a reference to the index configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// The file name of the active document, if any.
    pub async fn current_document(&self) -> Option<String> {
        self.active.read().await.as_ref().map(|a| a.document_name.clone())
    }

    /// Ingest a document and make its collection active.
    ///
    /// Idempotent by file name: if the derived collection already exists,
    /// no extraction or embedding work is repeated — the existing
    /// collection is simply activated. Concurrent first-time ingestion of
    /// the same file name is last-writer-wins on collection creation.
    ///
    /// Never raises past this boundary; any extraction, embedding, or
    /// storage failure is logged and reported as `false`.
    pub async fn ingest(&self, path: &Path) -> bool {
        match self.try_ingest(path).await {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path.display(), error = %e, "document ingest failed");
                false
            }
        }
    }

    async fn try_ingest(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RagError::Index(format!("invalid document path: {}", path.display())))?
            .to_string();
        let collection = collection_key(&file_name);

        if self.store.collection_exists(&collection).await? {
            info!(%collection, "collection already exists, activating");
            self.set_active(collection, file_name).await;
            return Ok(());
        }

        let text = extract_text(path)?;
        let document = Document {
            id: collection.clone(),
            text,
            metadata: [("source".to_string(), file_name.clone())].into(),
        };

        let mut chunks = self.chunker.chunk(&document);
        self.store.create_collection(&collection, self.embedder.dimensions()).await?;

        if chunks.is_empty() {
            info!(%collection, chunk_count = 0, "ingested document (empty)");
            self.set_active(collection, file_name).await;
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::Index(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.store.upsert(&collection, &chunks).await?;

        info!(%collection, chunk_count = chunks.len(), "ingested document");
        self.set_active(collection, file_name).await;
        Ok(())
    }

    /// Switch to a previously created collection by document name.
    ///
    /// Returns `false` when no such collection exists; the caller must not
    /// assume automatic re-ingestion.
    pub async fn activate(&self, document_name: &str) -> bool {
        let collection = collection_key(document_name);
        match self.store.collection_exists(&collection).await {
            Ok(true) => {
                info!(%collection, "switched to collection");
                self.set_active(collection, document_name.to_string()).await;
                true
            }
            Ok(false) => {
                warn!(%collection, "collection not found");
                false
            }
            Err(e) => {
                error!(%collection, error = %e, "collection lookup failed");
                false
            }
        }
    }

    async fn set_active(&self, collection: String, document_name: String) {
        *self.active.write().await = Some(ActiveCollection { collection, document_name });
    }

    /// Answer a question over the active collection.
    ///
    /// With no active collection, or no retrieval candidates, returns a
    /// fixed answer with an empty source list — neither case is an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError`] when embedding, search, reranking, or answer
    /// generation fails. The pipeline stage that calls this absorbs the
    /// error into a degraded answer.
    pub async fn query(&self, question: &str, history: &[ChatMessage]) -> Result<DocumentAnswer> {
        let Some(active) = self.active.read().await.clone() else {
            return Ok(DocumentAnswer { answer: NO_DOCUMENT_ANSWER.to_string(), sources: vec![] });
        };

        let query_embedding = self.embedder.embed(question).await?;
        let candidates = self
            .store
            .search(&active.collection, &query_embedding, self.config.top_k)
            .await?;

        debug!(collection = %active.collection, retrieved = candidates.len(), "retrieved candidates");

        if candidates.is_empty() {
            return Ok(DocumentAnswer { answer: NO_MATCHES_ANSWER.to_string(), sources: vec![] });
        }

        let reranked = self.reranker.rerank(question, candidates).await?;
        let kept: Vec<SearchResult> =
            reranked.into_iter().take(self.config.rerank_top_n).collect();

        let context: String =
            kept.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
        let system = format!("{QA_SYSTEM_PROMPT}\n\nContext: {context}");

        let answer = self.generator.chat(&system, history, question).await?;

        let sources: Vec<SourceExcerpt> = kept
            .iter()
            .map(|r| SourceExcerpt {
                preview: preview(&r.chunk.text, self.config.preview_len),
                metadata: r.chunk.metadata.clone(),
            })
            .collect();

        info!(collection = %active.collection, source_count = sources.len(), "document query answered");
        Ok(DocumentAnswer { answer, sources })
    }
}

/// First `len` characters plus an ellipsis.
fn preview(text: &str, len: usize) -> String {
    let mut out: String = text.chars().take(len).collect();
    out.push_str("...");
    out
}

/// Builder for constructing a [`DocumentIndex`].
///
/// `embedder`, `store`, and `generator` are required. The chunker defaults
/// to a [`RecursiveChunker`] sized from the config, and the reranker to
/// [`LexicalReranker`].
#[derive(Default)]
pub struct DocumentIndexBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    reranker: Option<Arc<dyn Reranker>>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl DocumentIndexBuilder {
    /// Set the index configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Set the answer-generation model.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`DocumentIndex`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `embedder`, `store`, or `generator`
    /// is missing.
    pub fn build(self) -> Result<DocumentIndex> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::Config("generator is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
        });
        let reranker = self.reranker.unwrap_or_else(|| Arc::new(LexicalReranker));

        Ok(DocumentIndex {
            config,
            embedder,
            store,
            chunker,
            reranker,
            generator,
            active: RwLock::new(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::InMemoryVectorStore;
    use arbor_model::{FailingModel, MockModel};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Letter-frequency embeddings: deterministic, 26 dimensions, and
    /// similar texts land near each other. Counts every embedding call.
    #[derive(Default)]
    struct CountingEmbedder {
        embedded_texts: AtomicUsize,
    }

    impl CountingEmbedder {
        fn embedded_texts(&self) -> usize {
            self.embedded_texts.load(Ordering::SeqCst)
        }
    }

    fn letter_frequencies(text: &str) -> Vec<f32> {
        let mut counts = vec![0.0f32; 26];
        for c in text.chars().flat_map(|c| c.to_lowercase()) {
            if c.is_ascii_lowercase() {
                counts[(c as u8 - b'a') as usize] += 1.0;
            }
        }
        counts
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.embedded_texts.fetch_add(1, Ordering::SeqCst);
            Ok(letter_frequencies(text))
        }

        fn dimensions(&self) -> usize {
            26
        }
    }

    struct Fixture {
        index: DocumentIndex,
        embedder: Arc<CountingEmbedder>,
        model: Arc<MockModel>,
    }

    fn fixture(config: RagConfig) -> Fixture {
        let embedder = Arc::new(CountingEmbedder::default());
        let model = Arc::new(MockModel::new());
        let index = DocumentIndex::builder()
            .config(config)
            .embedder(embedder.clone())
            .store(Arc::new(InMemoryVectorStore::new()))
            .generator(model.clone())
            .build()
            .unwrap();
        Fixture { index, embedder, model }
    }

    fn temp_doc(name_suffix: &str, text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::with_suffix(name_suffix).unwrap();
        write!(file, "{text}").unwrap();
        file
    }

    fn small_config() -> RagConfig {
        RagConfig::builder().chunk_size(60).chunk_overlap(10).build().unwrap()
    }

    #[tokio::test]
    async fn query_without_collection_is_fixed_answer_and_no_retrieval() {
        let fx = fixture(RagConfig::default());
        let answer = fx.index.query("anything", &[]).await.unwrap();
        assert_eq!(answer.answer, NO_DOCUMENT_ANSWER);
        assert!(answer.sources.is_empty());
        assert_eq!(fx.embedder.embedded_texts(), 0);
        assert_eq!(fx.model.call_count(), 0);
    }

    #[tokio::test]
    async fn ingest_is_idempotent_by_file_name() {
        let fx = fixture(small_config());
        let file = temp_doc(".txt", "alpha beta gamma delta epsilon zeta eta theta");

        assert!(fx.index.ingest(file.path()).await);
        let embedded = fx.embedder.embedded_texts();
        assert!(embedded > 0);

        // Second ingest of the same file name does no embedding work.
        assert!(fx.index.ingest(file.path()).await);
        assert_eq!(fx.embedder.embedded_texts(), embedded);
        assert!(fx.index.current_document().await.is_some());
    }

    #[tokio::test]
    async fn ingest_failure_returns_false() {
        let fx = fixture(RagConfig::default());
        assert!(!fx.index.ingest(Path::new("/nonexistent/report.pdf")).await);
        assert_eq!(fx.index.current_document().await, None);
    }

    #[tokio::test]
    async fn activate_requires_existing_collection() {
        let fx = fixture(small_config());
        assert!(!fx.index.activate("never_seen.pdf").await);

        let file = temp_doc(".txt", "some document body for activation");
        assert!(fx.index.ingest(file.path()).await);
        let name = fx.index.current_document().await.unwrap();
        assert!(fx.index.activate(&name).await);
    }

    #[tokio::test]
    async fn query_answers_with_rank_ordered_sources() {
        let fx = fixture(small_config());
        let paragraphs: Vec<String> = (0..8)
            .map(|i| format!("paragraph number {i} talks about topic {i} in some detail"))
            .collect();
        let file = temp_doc(".txt", &paragraphs.join("\n\n"));
        assert!(fx.index.ingest(file.path()).await);

        let answer = fx.index.query("what does paragraph number say", &[]).await.unwrap();
        // top_k = 5 retrieved, rerank keeps min(3, retrieved)
        assert_eq!(answer.sources.len(), 3);
        for source in &answer.sources {
            assert!(source.preview.ends_with("..."));
            assert!(source.metadata.contains_key("chunk_index"));
        }
        // The QA prompt carries the system instruction and the context block.
        let calls = fx.model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("Context:"));
        assert!(calls[0].user.contains("paragraph number"));
    }

    #[tokio::test]
    async fn rerank_never_keeps_more_than_retrieved() {
        let fx = fixture(small_config());
        let file = temp_doc(".txt", "tiny body");
        assert!(fx.index.ingest(file.path()).await);

        let answer = fx.index.query("tiny body question", &[]).await.unwrap();
        assert_eq!(answer.sources.len(), 1);
    }

    #[tokio::test]
    async fn generation_failure_propagates_as_error() {
        let embedder = Arc::new(CountingEmbedder::default());
        let index = DocumentIndex::builder()
            .config(small_config())
            .embedder(embedder)
            .store(Arc::new(InMemoryVectorStore::new()))
            .generator(Arc::new(FailingModel))
            .build()
            .unwrap();

        let file = temp_doc(".txt", "content that will be retrieved");
        assert!(index.ingest(file.path()).await);
        assert!(index.query("question", &[]).await.is_err());
    }

    #[tokio::test]
    async fn builder_requires_core_components() {
        assert!(DocumentIndex::builder().build().is_err());
    }

    #[test]
    fn preview_truncates_and_marks() {
        assert_eq!(preview("abcdef", 4), "abcd...");
        assert_eq!(preview("ab", 4), "ab...");
    }
}
