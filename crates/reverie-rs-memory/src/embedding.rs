//! Embedding provider abstraction.

use crate::error::EmbeddingError;
use async_trait::async_trait;

/// Maps text to a fixed-dimension vector.
///
/// Implementations must be deterministic for a fixed model identifier:
/// identical text yields an identical vector. Mixing vectors from different
/// model identifiers in one store silently invalidates similarity scores,
/// so the store records [`EmbeddingProvider::model_id`] and refuses to open
/// under a different one.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the embedding model, persisted alongside the store.
    fn model_id(&self) -> &str;

    /// Output vector dimension.
    fn dimension(&self) -> usize;

    /// Embed one non-empty text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
