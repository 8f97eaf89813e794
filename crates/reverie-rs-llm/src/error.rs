//! Error types for generation and speech calls.

use thiserror::Error;

/// Errors returned by the language-model call. Fatal to the current
/// request; no retry happens at this layer.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport-level failure reaching the model.
    #[error("http error: {0}")]
    Http(String),
    /// The API answered with a non-success status.
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    /// The call did not complete in time.
    #[error("generation timed out after {0}s")]
    Timeout(u64),
    /// The response carried no usable content.
    #[error("response contained no content")]
    MissingContent,
    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors returned by speech-to-text and text-to-speech calls.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Transport-level failure reaching the model.
    #[error("http error: {0}")]
    Http(String),
    /// The API answered with a non-success status.
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    /// The call did not complete in time.
    #[error("speech call timed out after {0}s")]
    Timeout(u64),
    /// The response carried no transcript or audio payload.
    #[error("response contained no speech content")]
    MissingContent,
    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}
