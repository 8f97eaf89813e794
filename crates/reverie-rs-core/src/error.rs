//! Error types for the conversation orchestrator.

use reverie_rs_llm::{GenerationError, SpeechError};
use thiserror::Error;

/// Errors surfaced to the transport layer for one request.
///
/// Memory failures never appear here: retrieval degrades to an empty
/// context and recording failures are logged, so only the generation and
/// speech paths can fail a request.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The model call failed; fatal to the current request.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    /// A speech call failed.
    #[error("speech error: {0}")]
    Speech(#[from] SpeechError),
    /// Audio container encoding failed.
    #[error("audio encoding error: {0}")]
    Audio(#[from] std::io::Error),
    /// Voice mode has not been enabled for this session.
    #[error("voice mode is not enabled")]
    VoiceDisabled,
    /// No speech model was configured.
    #[error("no speech model is configured")]
    SpeechUnavailable,
}
