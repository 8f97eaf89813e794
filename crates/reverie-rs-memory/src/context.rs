//! Formatted context block injected into prompts.

use crate::model::ScoredRecord;
use std::fmt;

/// Separator between rendered turns.
const TURN_SEPARATOR: &str = "\n\n";

/// Ranked prior turns rendered as a single prompt block.
///
/// Rebuilt for every request and discarded after use. The empty context is
/// a defined value, not an error, so callers can proceed with no prior
/// history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    block: String,
    turns: usize,
}

impl ConversationContext {
    /// The defined empty context.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Render ranked retrieval results under the fixed template: one
    /// `User:`/`Assistant:` labeled pair per turn, in ranked order.
    pub fn from_results(results: &[ScoredRecord]) -> Self {
        if results.is_empty() {
            return Self::empty();
        }
        let rendered: Vec<String> = results
            .iter()
            .map(|scored| {
                format!(
                    "User: {}\nAssistant: {}",
                    scored.record.input_text, scored.record.output_text
                )
            })
            .collect();
        Self {
            block: rendered.join(TURN_SEPARATOR),
            turns: results.len(),
        }
    }

    /// Whether no prior turns were recalled.
    pub fn is_empty(&self) -> bool {
        self.turns == 0
    }

    /// Number of recalled turns.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// The rendered block.
    pub fn as_str(&self) -> &str {
        &self.block
    }
}

impl fmt::Display for ConversationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.block)
    }
}

#[cfg(test)]
mod tests {
    use super::ConversationContext;
    use crate::model::{MemoryRecord, ScoredRecord};
    use pretty_assertions::assert_eq;

    fn scored(input: &str, output: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            record: MemoryRecord {
                id: uuid::Uuid::new_v4(),
                input_text: input.to_string(),
                output_text: output.to_string(),
                embedding: vec![0.0],
                seq: 0,
                created_at: chrono::Utc::now(),
            },
            score,
        }
    }

    #[test]
    fn empty_context_is_defined_and_empty() {
        let context = ConversationContext::empty();
        assert!(context.is_empty());
        assert_eq!(context.as_str(), "");
        assert_eq!(context, ConversationContext::from_results(&[]));
    }

    #[test]
    fn renders_labeled_pairs_in_ranked_order() {
        let results = vec![
            scored("What is the capital of France?", "Paris.", 0.9),
            scored("What is 2+2?", "4.", 0.2),
        ];
        let context = ConversationContext::from_results(&results);
        assert_eq!(context.turns(), 2);
        assert_eq!(
            context.as_str(),
            "User: What is the capital of France?\nAssistant: Paris.\n\n\
             User: What is 2+2?\nAssistant: 4."
        );
    }
}
