//! Chat model seam: prompt in, generated text out.

use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message author, in the model's own role vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The model's prior output.
    Model,
}

/// One message in a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor for a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Standing instruction kept out of the message list.
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// The generated reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    /// Model that produced the reply.
    pub model: String,
}

/// Opaque language-model call: prompt in, text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply for the request.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, GenerationError>;

    /// Name of the configured model.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::{ChatMessage, ChatRequest, Role};
    use pretty_assertions::assert_eq;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
    }

    #[test]
    fn chat_request_roundtrip() {
        let request = ChatRequest {
            system_prompt: Some("Be brief.".to_string()),
            messages: vec![ChatMessage::user("Hi")],
            temperature: Some(0.0),
            max_output_tokens: Some(256),
        };
        let json = serde_json::to_string(&request).unwrap();
        let decoded: ChatRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(decoded.messages.len(), 1);
        assert_eq!(decoded.messages[0].role, Role::User);
    }
}
