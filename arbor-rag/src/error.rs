//! Error types for the `arbor-rag` crate.

use thiserror::Error;

/// Errors that can occur in document-index operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Text extraction from a source document failed.
    #[error("Extraction error ({path}): {message}")]
    Extraction {
        /// The path that failed to extract.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during result reranking.
    #[error("Reranker error: {0}")]
    Reranker(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in index orchestration.
    #[error("Index error: {0}")]
    Index(String),

    /// An error propagated from a model call.
    #[error(transparent)]
    Model(#[from] arbor_core::CoreError),
}

/// A convenience result type for document-index operations.
pub type Result<T> = std::result::Result<T, RagError>;
