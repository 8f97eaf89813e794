//! Conversation orchestrator: retrieve, generate, record.
//!
//! One request moves through three phases. Retrieval failures degrade to an
//! empty context and recording failures are logged, so the user gets a
//! reply whenever generation itself succeeds. Only a generation failure
//! aborts a request, and an aborted request records nothing.

use crate::error::CoreError;
use crate::prompt;
use log::{debug, info, warn};
use reverie_rs_llm::{ChatModel, DEFAULT_VOICE, SpeechModel};
use reverie_rs_memory::{ConversationContext, MemoryManager};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Main orchestration facade: answers utterances and bridges speech.
///
/// Holds its collaborators explicitly; constructed once at startup and
/// shared behind `Arc` across concurrent requests. A slow generation for
/// one request never stalls another.
pub struct Orchestrator {
    memory: Arc<MemoryManager>,
    model: Arc<dyn ChatModel>,
    speech: Option<Arc<dyn SpeechModel>>,
    voice: String,
    /// Voice capability flag, checked per request.
    voice_enabled: AtomicBool,
}

impl Orchestrator {
    /// Construct an orchestrator over a memory manager and chat model.
    pub fn new(memory: Arc<MemoryManager>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            memory,
            model,
            speech: None,
            voice: DEFAULT_VOICE.to_string(),
            voice_enabled: AtomicBool::new(false),
        }
    }

    /// Wire a speech model for transcription and synthesis.
    pub fn with_speech(mut self, speech: Arc<dyn SpeechModel>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Override the synthesis voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Answer one utterance.
    ///
    /// Phases: retrieve prior context, generate a reply, record the
    /// completed turn. The reply is returned even when retrieval or
    /// recording fail; a generation failure aborts the request before
    /// anything is recorded.
    pub async fn respond(&self, utterance: &str) -> Result<String, CoreError> {
        let context = match self.memory.retrieve(utterance).await {
            Ok(context) => context,
            Err(err) => {
                warn!("retrieval failed, continuing without context: {err}");
                ConversationContext::empty()
            }
        };
        debug!(
            "generating reply (context_turns={}, utterance_len={})",
            context.turns(),
            utterance.len()
        );

        let request = prompt::build_request(&context, utterance);
        let reply = self.model.complete(request).await?.content;

        match self.memory.record(utterance, &reply).await {
            Ok(id) => debug!("turn recorded (id={id})"),
            Err(err) => warn!("failed to record turn, reply already delivered: {err}"),
        }
        Ok(reply)
    }

    /// Enable voice handling for subsequent requests.
    pub fn enable_voice(&self) {
        self.voice_enabled.store(true, Ordering::Relaxed);
        info!("voice mode enabled");
    }

    /// Whether voice handling is currently enabled.
    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled.load(Ordering::Relaxed)
    }

    /// Transcribe inbound audio. Requires voice mode and a speech model.
    pub async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, CoreError> {
        if !self.voice_enabled() {
            return Err(CoreError::VoiceDisabled);
        }
        let speech = self.speech.as_ref().ok_or(CoreError::SpeechUnavailable)?;
        Ok(speech.transcribe(audio, mime_type).await?)
    }

    /// Render text as a WAV audio file. Works without voice mode, matching
    /// the explicit synthesis command it backs.
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>, CoreError> {
        let speech = self.speech.as_ref().ok_or(CoreError::SpeechUnavailable)?;
        let pcm = speech.synthesize(text, &self.voice).await?;
        Ok(pcm.to_wav()?)
    }
}

#[cfg(test)]
mod tests {
    use super::Orchestrator;
    use crate::error::CoreError;
    use pretty_assertions::assert_eq;
    use reverie_rs_llm::ChatModel;
    use reverie_rs_memory::{EmbeddingProvider, MemoryManager, VectorStore};
    use reverie_rs_test_utils::{
        FailingChatModel, FailingEmbedder, FixedChatModel, RecordingChatModel, StubEmbedder,
        StubSpeechModel,
    };
    use std::sync::Arc;
    use tempfile::tempdir;

    fn memory_with(embedder: Arc<dyn EmbeddingProvider>, dir: &std::path::Path) -> Arc<MemoryManager> {
        let store = Arc::new(
            VectorStore::open(dir.join("db"), embedder.model_id(), embedder.dimension())
                .expect("open"),
        );
        Arc::new(MemoryManager::new(embedder, store))
    }

    #[tokio::test]
    async fn responds_and_records_the_turn() {
        let temp = tempdir().expect("tempdir");
        let memory = memory_with(Arc::new(StubEmbedder::new()), temp.path());
        let orchestrator = Orchestrator::new(Arc::clone(&memory), Arc::new(FixedChatModel::new("Paris.")));

        let reply = orchestrator
            .respond("What is the capital of France?")
            .await
            .expect("reply");
        assert_eq!(reply, "Paris.");
        assert_eq!(memory.store().len(), 1);
    }

    #[tokio::test]
    async fn failed_generation_records_nothing() {
        let temp = tempdir().expect("tempdir");
        let memory = memory_with(Arc::new(StubEmbedder::new()), temp.path());
        let orchestrator = Orchestrator::new(Arc::clone(&memory), Arc::new(FailingChatModel));

        let err = orchestrator.respond("Hello").await.expect_err("generation fails");
        assert!(matches!(err, CoreError::Generation(_)));
        assert!(memory.store().is_empty());
    }

    #[tokio::test]
    async fn retrieval_failure_degrades_to_empty_context() {
        let temp = tempdir().expect("tempdir");
        // The embedder fails for both retrieve and record; the reply must
        // still come back.
        let memory = memory_with(Arc::new(FailingEmbedder::new("stub-embedder", 4)), temp.path());
        let orchestrator = Orchestrator::new(Arc::clone(&memory), Arc::new(FixedChatModel::new("Hi!")));

        let reply = orchestrator.respond("Hello").await.expect("reply");
        assert_eq!(reply, "Hi!");
        assert!(memory.store().is_empty());
    }

    #[tokio::test]
    async fn record_failure_does_not_fail_the_reply() {
        let temp = tempdir().expect("tempdir");
        let memory = memory_with(Arc::new(StubEmbedder::new()), temp.path());
        memory.store().close();
        let orchestrator = Orchestrator::new(Arc::clone(&memory), Arc::new(FixedChatModel::new("Hi!")));

        let reply = orchestrator.respond("Hello").await.expect("reply");
        assert_eq!(reply, "Hi!");
        assert!(memory.store().is_empty());
    }

    #[tokio::test]
    async fn recalled_turns_reach_the_prompt() {
        let temp = tempdir().expect("tempdir");
        let memory = memory_with(Arc::new(StubEmbedder::new()), temp.path());
        memory
            .record("What is the capital of France?", "Paris.")
            .await
            .expect("record");

        let model = Arc::new(RecordingChatModel::new("It is a country in Europe."));
        let orchestrator =
            Orchestrator::new(Arc::clone(&memory), Arc::clone(&model) as Arc<dyn ChatModel>);
        orchestrator
            .respond("Tell me about France")
            .await
            .expect("reply");

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        let content = &requests[0].messages[0].content;
        assert!(content.contains("Assistant: Paris."));
        assert!(content.contains("Tell me about France"));
    }

    #[tokio::test]
    async fn transcribe_is_gated_on_the_voice_flag() {
        let temp = tempdir().expect("tempdir");
        let memory = memory_with(Arc::new(StubEmbedder::new()), temp.path());
        let orchestrator = Orchestrator::new(memory, Arc::new(FixedChatModel::new("Hi!")))
            .with_speech(Arc::new(StubSpeechModel::new("hello there", vec![0u8; 4])));

        let err = orchestrator
            .transcribe(b"audio", "audio/ogg; codecs=opus")
            .await
            .expect_err("disabled");
        assert!(matches!(err, CoreError::VoiceDisabled));

        orchestrator.enable_voice();
        assert!(orchestrator.voice_enabled());
        let transcript = orchestrator
            .transcribe(b"audio", "audio/ogg; codecs=opus")
            .await
            .expect("transcript");
        assert_eq!(transcript, "hello there");
    }

    #[tokio::test]
    async fn transcribe_without_a_speech_model_is_unavailable() {
        let temp = tempdir().expect("tempdir");
        let memory = memory_with(Arc::new(StubEmbedder::new()), temp.path());
        let orchestrator = Orchestrator::new(memory, Arc::new(FixedChatModel::new("Hi!")));
        orchestrator.enable_voice();

        let err = orchestrator
            .transcribe(b"audio", "audio/ogg")
            .await
            .expect_err("unavailable");
        assert!(matches!(err, CoreError::SpeechUnavailable));
    }

    #[tokio::test]
    async fn speak_returns_a_wav_container() {
        let temp = tempdir().expect("tempdir");
        let memory = memory_with(Arc::new(StubEmbedder::new()), temp.path());
        let orchestrator = Orchestrator::new(memory, Arc::new(FixedChatModel::new("Hi!")))
            .with_speech(Arc::new(StubSpeechModel::new("", vec![1u8, 2, 3, 4])));

        // No voice arming needed for explicit synthesis.
        let wav = orchestrator.speak("Hello").await.expect("wav");
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[44..], &[1u8, 2, 3, 4]);
    }
}
