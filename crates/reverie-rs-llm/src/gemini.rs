//! Gemini HTTP client: chat generation, text embeddings, and speech.
//!
//! One client drives all four external calls against the Generative
//! Language API. Every request shares the same bounded timeout; expiry
//! surfaces as the corresponding error kind rather than hanging a request.

use crate::chat::{ChatModel, ChatRequest, ChatResponse, Role};
use crate::error::{GenerationError, SpeechError};
use crate::speech::{PcmAudio, SpeechModel};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;
use reverie_rs_memory::{EmbeddingError, EmbeddingProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";
/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
/// Output dimension of the default embedding model.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;
/// Default transcription model.
pub const DEFAULT_STT_MODEL: &str = "gemini-2.5-flash";
/// Default speech synthesis model.
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
/// Default prebuilt synthesis voice.
pub const DEFAULT_VOICE: &str = "Kore";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const TRANSCRIPT_PROMPT: &str = "Please provide a verbatim transcript of this audio.";
/// Conservative character bound below the embedding model's token limit.
const MAX_EMBED_CHARS: usize = 8_192;

/// Synthesis output is raw little-endian 16-bit PCM, mono, 24 kHz.
const TTS_SAMPLE_RATE: u32 = 24_000;
const TTS_CHANNELS: u16 = 1;
const TTS_BYTES_PER_SAMPLE: u16 = 2;

// ---- wire format -----------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechGenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechGenerationConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

// ---- client ----------------------------------------------------------------

/// Failure of one HTTP round trip, before mapping to a public error kind.
enum RequestError {
    Timeout(u64),
    Http(String),
    Api { status: u16, body: String },
    Decode(String),
}

impl From<RequestError> for GenerationError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Timeout(secs) => GenerationError::Timeout(secs),
            RequestError::Http(message) => GenerationError::Http(message),
            RequestError::Api { status, body } => GenerationError::Api { status, body },
            RequestError::Decode(message) => GenerationError::Decode(message),
        }
    }
}

impl From<RequestError> for SpeechError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Timeout(secs) => SpeechError::Timeout(secs),
            RequestError::Http(message) => SpeechError::Http(message),
            RequestError::Api { status, body } => SpeechError::Api { status, body },
            RequestError::Decode(message) => SpeechError::Decode(message),
        }
    }
}

impl From<RequestError> for EmbeddingError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Timeout(secs) => EmbeddingError::Timeout(secs),
            RequestError::Http(message) => EmbeddingError::Backend(message),
            RequestError::Api { status, body } => {
                EmbeddingError::Backend(format!("api error {status}: {body}"))
            }
            RequestError::Decode(message) => EmbeddingError::Backend(message),
        }
    }
}

/// Gemini API client implementing the chat, embedding, and speech seams.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    embedding_dimension: usize,
    stt_model: String,
    tts_model: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Start building a client for the given API key.
    pub fn builder(api_key: impl Into<String>) -> GeminiClientBuilder {
        GeminiClientBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            stt_model: DEFAULT_STT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            temperature: 0.0,
            max_output_tokens: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    fn model_url(&self, model: &str, verb: &str) -> String {
        format!("{}/models/{model}:{verb}", self.base_url)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: &impl Serialize,
    ) -> Result<T, RequestError> {
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RequestError::Timeout(self.timeout_secs)
                } else {
                    RequestError::Http(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|err| RequestError::Decode(err.to_string()))
    }

    fn chat_body(&self, request: &ChatRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|message| Content {
                role: Some(
                    match message.role {
                        Role::User => "user",
                        Role::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part::text(message.content.as_str())],
            })
            .collect();
        GenerateContentRequest {
            contents,
            system_instruction: request.system_prompt.as_deref().map(|prompt| Content {
                role: None,
                parts: vec![Part::text(prompt)],
            }),
            generation_config: Some(GenerationConfig {
                temperature: request.temperature.or(Some(self.temperature)),
                max_output_tokens: request.max_output_tokens.or(self.max_output_tokens),
                response_modalities: None,
                speech_config: None,
            }),
        }
    }

    fn transcribe_body(audio: &[u8], mime_type: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::text(TRANSCRIPT_PROMPT),
                    Part::inline_data(mime_type, BASE64.encode(audio)),
                ],
            }],
            system_instruction: None,
            generation_config: None,
        }
    }

    fn synthesize_body(text: &str, voice: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(text)],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: None,
                max_output_tokens: None,
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechGenerationConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
            }),
        }
    }

    fn embed_body(text: &str) -> EmbedContentRequest {
        EmbedContentRequest {
            content: Content {
                role: None,
                parts: vec![Part::text(text)],
            },
        }
    }
}

/// Concatenated text of the first candidate, if any.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let parts = first_candidate_parts(response)?;
    let text: String = parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");
    if text.is_empty() { None } else { Some(text) }
}

/// Inline data payload of the first candidate, if any.
fn extract_inline_data(response: GenerateContentResponse) -> Option<InlineData> {
    first_candidate_parts(response)?
        .into_iter()
        .find_map(|part| part.inline_data)
}

fn first_candidate_parts(response: GenerateContentResponse) -> Option<Vec<Part>> {
    response
        .candidates?
        .into_iter()
        .next()?
        .content
        .map(|content| content.parts)
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, GenerationError> {
        let body = self.chat_body(&request);
        debug!(
            "generating reply (model={}, messages={})",
            self.chat_model,
            request.messages.len()
        );
        let response: GenerateContentResponse = self
            .post_json(self.model_url(&self.chat_model, "generateContent"), &body)
            .await?;
        let model = response
            .model_version
            .clone()
            .unwrap_or_else(|| self.chat_model.clone());
        let content = extract_text(response).ok_or(GenerationError::MissingContent)?;
        Ok(ChatResponse { content, model })
    }

    fn model_name(&self) -> &str {
        &self.chat_model
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    fn model_id(&self) -> &str {
        &self.embedding_model
    }

    fn dimension(&self) -> usize {
        self.embedding_dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let length = text.chars().count();
        if length > MAX_EMBED_CHARS {
            return Err(EmbeddingError::InputTooLong {
                length,
                max: MAX_EMBED_CHARS,
            });
        }
        let body = Self::embed_body(text);
        let response: EmbedContentResponse = self
            .post_json(self.model_url(&self.embedding_model, "embedContent"), &body)
            .await?;
        let values = response.embedding.values;
        if values.len() != self.embedding_dimension {
            return Err(EmbeddingError::Backend(format!(
                "unexpected embedding dimension: got {}, expected {}",
                values.len(),
                self.embedding_dimension
            )));
        }
        Ok(values)
    }
}

#[async_trait]
impl SpeechModel for GeminiClient {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, SpeechError> {
        debug!(
            "transcribing audio (model={}, bytes={}, mime={mime_type})",
            self.stt_model,
            audio.len()
        );
        let body = Self::transcribe_body(audio, mime_type);
        let response: GenerateContentResponse = self
            .post_json(self.model_url(&self.stt_model, "generateContent"), &body)
            .await?;
        extract_text(response).ok_or(SpeechError::MissingContent)
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<PcmAudio, SpeechError> {
        debug!(
            "synthesizing speech (model={}, voice={voice}, chars={})",
            self.tts_model,
            text.chars().count()
        );
        let body = Self::synthesize_body(text, voice);
        let response: GenerateContentResponse = self
            .post_json(self.model_url(&self.tts_model, "generateContent"), &body)
            .await?;
        let inline = extract_inline_data(response).ok_or(SpeechError::MissingContent)?;
        let data = BASE64
            .decode(inline.data.as_bytes())
            .map_err(|err| SpeechError::Decode(err.to_string()))?;
        Ok(PcmAudio {
            data,
            sample_rate: TTS_SAMPLE_RATE,
            channels: TTS_CHANNELS,
            bytes_per_sample: TTS_BYTES_PER_SAMPLE,
        })
    }
}

/// Builder for [`GeminiClient`].
pub struct GeminiClientBuilder {
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    embedding_dimension: usize,
    stt_model: String,
    tts_model: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
    timeout_secs: u64,
}

impl GeminiClientBuilder {
    /// Override the API base URL (self-hosted proxies, tests).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Chat model name.
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Embedding model name and its output dimension.
    pub fn embedding_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.embedding_model = model.into();
        self.embedding_dimension = dimension;
        self
    }

    /// Transcription model name.
    pub fn stt_model(mut self, model: impl Into<String>) -> Self {
        self.stt_model = model.into();
        self
    }

    /// Synthesis model name.
    pub fn tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    /// Default sampling temperature for chat requests.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Default output token cap for chat requests.
    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Per-request timeout applied to every call.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Finalize the client.
    pub fn build(self) -> Result<GeminiClient, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|err| GenerationError::Http(err.to_string()))?;
        Ok(GeminiClient {
            http,
            api_key: self.api_key,
            base_url: self.base_url,
            chat_model: self.chat_model,
            embedding_model: self.embedding_model,
            embedding_dimension: self.embedding_dimension,
            stt_model: self.stt_model,
            tts_model: self.tts_model,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            timeout_secs: self.timeout_secs,
        })
    }
}
