//! Chat and speech model stubs for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reverie_rs_llm::{
    ChatModel, ChatRequest, ChatResponse, GenerationError, PcmAudio, SpeechError, SpeechModel,
};

/// Chat model that always returns the same reply.
pub struct FixedChatModel {
    reply: String,
}

impl FixedChatModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ChatModel for FixedChatModel {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, GenerationError> {
        Ok(ChatResponse {
            content: self.reply.clone(),
            model: "fixed".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Chat model whose calls always fail.
pub struct FailingChatModel;

#[async_trait]
impl ChatModel for FailingChatModel {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, GenerationError> {
        Err(GenerationError::Http("stub failure".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Chat model that captures every request and returns a fixed reply.
pub struct RecordingChatModel {
    reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl RecordingChatModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChatModel for RecordingChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, GenerationError> {
        self.requests.lock().push(request);
        Ok(ChatResponse {
            content: self.reply.clone(),
            model: "recording".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Speech model returning a fixed transcript and fixed PCM samples.
pub struct StubSpeechModel {
    transcript: String,
    pcm: Vec<u8>,
}

impl StubSpeechModel {
    pub fn new(transcript: impl Into<String>, pcm: Vec<u8>) -> Self {
        Self {
            transcript: transcript.into(),
            pcm,
        }
    }
}

#[async_trait]
impl SpeechModel for StubSpeechModel {
    async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String, SpeechError> {
        Ok(self.transcript.clone())
    }

    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<PcmAudio, SpeechError> {
        Ok(PcmAudio {
            data: self.pcm.clone(),
            sample_rate: 24_000,
            channels: 1,
            bytes_per_sample: 2,
        })
    }
}
