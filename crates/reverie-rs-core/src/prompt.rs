//! Prompt assembly for the generation call.

use reverie_rs_llm::{ChatMessage, ChatRequest};
use reverie_rs_memory::ConversationContext;

/// Standing instruction for the assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the \
relevant pieces of previous conversation, when provided, to inform your reply. \
If they are not relevant, ignore them.";

const CONTEXT_HEADER: &str = "Relevant pieces of previous conversation:";
const UTTERANCE_HEADER: &str = "Current message:";

/// Build the generation request from recalled context and the new utterance.
///
/// With an empty context the utterance goes through bare; the model never
/// sees an empty history block.
pub fn build_request(context: &ConversationContext, utterance: &str) -> ChatRequest {
    let content = if context.is_empty() {
        utterance.to_string()
    } else {
        format!("{CONTEXT_HEADER}\n{context}\n\n{UTTERANCE_HEADER}\n{utterance}")
    };
    ChatRequest {
        system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        messages: vec![ChatMessage::user(content)],
        temperature: None,
        max_output_tokens: None,
    }
}
