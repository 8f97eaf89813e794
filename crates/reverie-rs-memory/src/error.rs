//! Error types for memory operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Input text was empty.
    #[error("empty input text")]
    EmptyInput,
    /// Input exceeds the model's maximum length.
    #[error("input too long: {length} chars exceeds {max}")]
    InputTooLong { length: usize, max: usize },
    /// The backing model failed or is unavailable.
    #[error("embedding backend error: {0}")]
    Backend(String),
    /// The embedding call did not complete in time.
    #[error("embedding timed out after {0}s")]
    Timeout(u64),
}

/// Errors returned by the vector store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted store is unreadable. Distinct from "does not exist yet",
    /// which silently creates an empty store.
    #[error("corrupt store at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    /// The store was built under a different embedding model.
    #[error("embedding model mismatch: store was built with '{found}', provider is '{expected}'")]
    EmbeddingMismatch { expected: String, found: String },
    /// Vector length disagrees with the store dimension.
    #[error("dimension mismatch: expected {expected}, got {found}")]
    Dimension { expected: usize, found: usize },
    /// The store handle has been closed.
    #[error("store is closed")]
    Closed,
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors returned by the memory manager.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Embedding the query or turn failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
