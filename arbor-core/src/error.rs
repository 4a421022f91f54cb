//! Error types shared across Arbor crates.

use thiserror::Error;

/// Errors produced by model calls and shared configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A text-generation model call failed (transport, API, or parse).
    #[error("Model error: {0}")]
    Model(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
