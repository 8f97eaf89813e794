//! Persisted record model for the vector store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted conversational turn with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier, assigned at insert time.
    pub id: Uuid,
    /// The user's utterance.
    pub input_text: String,
    /// The generated reply.
    pub output_text: String,
    /// Embedding of the canonical turn rendering.
    pub embedding: Vec<f32>,
    /// Store-assigned write order. Used only for tie-breaking, never ranking.
    pub seq: u64,
    /// Wall-clock insert time, informational.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Canonical text a completed turn is embedded under.
    pub fn canonical_text(input_text: &str, output_text: &str) -> String {
        format!("input: {input_text}\noutput: {output_text}")
    }
}

/// A completed turn awaiting insertion. The store assigns id and order.
#[derive(Debug, Clone)]
pub struct TurnDraft {
    /// The user's utterance.
    pub input_text: String,
    /// The generated reply.
    pub output_text: String,
    /// Embedding of the canonical turn rendering.
    pub embedding: Vec<f32>,
}

/// A record paired with its similarity score for one query.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    /// The matched record.
    pub record: MemoryRecord,
    /// Cosine similarity against the query vector.
    pub score: f32,
}
