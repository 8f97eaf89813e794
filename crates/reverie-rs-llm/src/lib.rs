//! Opaque external model calls for Reverie: chat generation, text
//! embeddings, speech-to-text, and text-to-speech, plus the pure PCM-to-WAV
//! container transform. Each call is a trait seam; the Gemini client is the
//! production implementation of all of them.

pub mod chat;
pub mod error;
pub mod gemini;
pub mod speech;
pub mod wav;

/// Chat seam types.
pub use chat::{ChatMessage, ChatModel, ChatRequest, ChatResponse, Role};
/// Generation and speech error types.
pub use error::{GenerationError, SpeechError};
/// Gemini client and its defaults.
pub use gemini::{
    DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL, DEFAULT_STT_MODEL,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TTS_MODEL, DEFAULT_VOICE, GeminiClient, GeminiClientBuilder,
};
/// Speech seam types.
pub use speech::{PcmAudio, SpeechModel};
/// WAV container helpers.
pub use wav::{WavSpec, pcm_to_wav, write_wav};
