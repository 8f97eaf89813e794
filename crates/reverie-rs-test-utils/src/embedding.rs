//! Deterministic embedders for tests.

use async_trait::async_trait;
use reverie_rs_memory::{EmbeddingError, EmbeddingProvider};

/// Bucket count: one axis per leading character pair, plus one catch-all
/// for tokens without two leading letters.
const DIMENSION: usize = 26 * 26 + 1;

/// Deterministic test embedder.
///
/// Tokenizes on non-alphanumeric boundaries and buckets each token by its
/// two leading letters, so texts sharing words land on shared axes without
/// any hash collisions to reason about. Vectors are L2-normalized: a text
/// always has cosine similarity 1.0 with itself.
pub struct StubEmbedder {
    model_id: String,
}

impl StubEmbedder {
    /// Embedder with the default model identifier.
    pub fn new() -> Self {
        Self::with_model_id("stub-embedder")
    }

    /// Embedder reporting a specific model identifier, for mismatch tests.
    pub fn with_model_id(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let mut vector = vec![0.0f32; DIMENSION];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
        {
            vector[bucket(token)] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }
}

/// Axis for a token: `1 + first*26 + second` for two leading ASCII
/// letters, else the catch-all axis 0.
fn bucket(token: &str) -> usize {
    let mut letters = token.chars().filter_map(|c| {
        if c.is_ascii_lowercase() {
            Some(c as usize - 'a' as usize)
        } else {
            None
        }
    });
    match (letters.next(), letters.next()) {
        (Some(first), Some(second)) => 1 + first * 26 + second,
        _ => 0,
    }
}

/// Embedder whose calls always fail, for degraded-path tests.
pub struct FailingEmbedder {
    model_id: String,
    dimension: usize,
}

impl FailingEmbedder {
    pub fn new(model_id: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dimension,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Backend("stub failure".to_string()))
    }
}
