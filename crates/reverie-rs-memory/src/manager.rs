//! Retrieval policy: turns conversation turns into store records and back.

use crate::context::ConversationContext;
use crate::embedding::EmbeddingProvider;
use crate::error::MemoryError;
use crate::model::{MemoryRecord, TurnDraft};
use crate::store::VectorStore;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// Default number of prior turns recalled per request.
pub const DEFAULT_RECALL_LIMIT: usize = 5;

/// Translates between raw conversational turns and the vector store.
///
/// Holds its embedding provider and store explicitly; constructed once at
/// startup and passed to the orchestrator rather than living in ambient
/// globals.
pub struct MemoryManager {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<VectorStore>,
    recall_limit: usize,
}

impl MemoryManager {
    /// Create a manager with the default recall limit.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<VectorStore>) -> Self {
        Self {
            embedder,
            store,
            recall_limit: DEFAULT_RECALL_LIMIT,
        }
    }

    /// Override the number of turns recalled per request.
    pub fn with_recall_limit(mut self, recall_limit: usize) -> Self {
        self.recall_limit = recall_limit;
        self
    }

    /// Embed `query_text` and render the nearest prior turns for prompt
    /// injection. An empty store yields the defined empty context.
    pub async fn retrieve(&self, query_text: &str) -> Result<ConversationContext, MemoryError> {
        let vector = self.embedder.embed(query_text).await?;
        let results = self.store.query(&vector, self.recall_limit)?;
        debug!(
            "retrieved context (recalled={}, limit={})",
            results.len(),
            self.recall_limit
        );
        Ok(ConversationContext::from_results(&results))
    }

    /// Persist a completed turn and return its assigned id.
    ///
    /// Only called after a reply has been produced; a failed generation
    /// never reaches this point, so no partial record can exist.
    pub async fn record(&self, input_text: &str, output_text: &str) -> Result<Uuid, MemoryError> {
        let canonical = MemoryRecord::canonical_text(input_text, output_text);
        let embedding = self.embedder.embed(&canonical).await?;
        let id = self.store.insert(TurnDraft {
            input_text: input_text.to_string(),
            output_text: output_text.to_string(),
            embedding,
        })?;
        debug!(
            "recorded turn (id={id}, input_len={}, output_len={})",
            input_text.len(),
            output_text.len()
        );
        Ok(id)
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }
}
