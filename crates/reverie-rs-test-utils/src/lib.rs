//! Test helpers shared across Reverie crates.

pub mod embedding;
pub mod llm;

pub use embedding::{FailingEmbedder, StubEmbedder};
pub use llm::{FailingChatModel, FixedChatModel, RecordingChatModel, StubSpeechModel};
