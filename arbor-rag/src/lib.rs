//! # arbor-rag
//!
//! The document side of the Arbor agent: a [`DocumentIndex`] that ingests
//! one vector collection per document and answers questions over the active
//! collection with a retrieve → rerank → generate pipeline.
//!
//! ## Design
//!
//! - One collection per ingested document, keyed by a deterministic
//!   sanitized name derived from the file name ([`collection_key`]).
//!   Re-ingesting a known file name activates the existing collection
//!   without re-embedding.
//! - Retrieval is two-stage: embedding similarity is a coarse recall
//!   filter (top-K), and a [`Reranker`] sharpens precision before the
//!   small context window is handed to the answer model.
//! - Every external call sits behind a narrow trait —
//!   [`EmbeddingProvider`], [`VectorStore`], [`Reranker`], and
//!   [`TextGenerator`](arbor_core::TextGenerator) — so the index is fully
//!   testable with deterministic stand-ins.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arbor_rag::{DocumentIndex, InMemoryVectorStore, OpenAiEmbedder, RagConfig};
//!
//! let index = DocumentIndex::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(OpenAiEmbedder::from_env()?))
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .generator(model)
//!     .build()?;
//!
//! index.ingest(Path::new("paper.pdf")).await;
//! let answer = index.query("What is this paper about?", &history).await?;
//! ```

mod chunking;
mod config;
mod document;
mod embedding;
mod error;
mod extract;
mod index;
mod inmemory;
mod naming;
mod openai;
mod reranker;
mod vectorstore;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, DocumentAnswer, SearchResult, SourceExcerpt};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::extract_text;
pub use index::{DocumentIndex, DocumentIndexBuilder, NO_DOCUMENT_ANSWER, NO_MATCHES_ANSWER};
pub use inmemory::InMemoryVectorStore;
pub use naming::collection_key;
pub use openai::OpenAiEmbedder;
pub use reranker::{LexicalReranker, Reranker};
pub use vectorstore::VectorStore;
