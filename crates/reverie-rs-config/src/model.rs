//! Configuration schema for Reverie.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for the Reverie agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReverieConfig {
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl ReverieConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ReverieConfigBuilder {
        ReverieConfigBuilder::new()
    }

    /// Validate field-level constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.recall_limit == 0 {
            return Err(ConfigError::Invalid(
                "memory.recall_limit must be at least 1".to_string(),
            ));
        }
        if self.memory.embedding_dimension == 0 {
            return Err(ConfigError::Invalid(
                "memory.embedding_dimension must be at least 1".to_string(),
            ));
        }
        if self.memory.embedding_model.is_empty() {
            return Err(ConfigError::Invalid(
                "memory.embedding_model must not be empty".to_string(),
            ));
        }
        if self.model.name.is_empty() {
            return Err(ConfigError::Invalid(
                "model.name must not be empty".to_string(),
            ));
        }
        if self.model.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "model.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for assembling a `ReverieConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ReverieConfigBuilder {
    config: ReverieConfig,
}

impl ReverieConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ReverieConfig::default(),
        }
    }

    /// Replace the memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the model configuration.
    pub fn model(mut self, model: ModelConfig) -> Self {
        self.config.model = model;
        self
    }

    /// Replace the speech configuration.
    pub fn speech(mut self, speech: SpeechConfig) -> Self {
        self.config.speech = speech;
        self
    }

    /// Finalize and return the built `ReverieConfig`.
    pub fn build(self) -> ReverieConfig {
        self.config
    }
}

/// Memory subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Store directory; resolved to the platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Prior turns recalled per request.
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,
    /// Embedding model identifier; persisted with the store.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Embedding output dimension.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            recall_limit: default_recall_limit(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

/// Language-model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Chat model name.
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f32,
    /// Optional output token cap.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    /// Per-request timeout for external calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            temperature: 0.0,
            max_output_tokens: None,
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Speech bridging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Prebuilt synthesis voice.
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Transcription model name.
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    /// Synthesis model name.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
        }
    }
}

fn default_recall_limit() -> usize {
    5
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_embedding_dimension() -> usize {
    768
}

fn default_model_name() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_stt_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}
