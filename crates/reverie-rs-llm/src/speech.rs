//! Speech model seam: audio to text and text to raw PCM audio.

use crate::error::SpeechError;
use crate::wav::{self, WavSpec};
use async_trait::async_trait;

/// Raw PCM audio as returned by a text-to-speech call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    /// Little-endian signed PCM samples.
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub bytes_per_sample: u16,
}

impl PcmAudio {
    /// Wrap the samples in a WAV container.
    pub fn to_wav(&self) -> std::io::Result<Vec<u8>> {
        wav::pcm_to_wav(
            &self.data,
            WavSpec {
                channels: self.channels,
                sample_rate: self.sample_rate,
                bytes_per_sample: self.bytes_per_sample,
            },
        )
    }
}

/// Opaque speech calls: audio<->text in both directions.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Produce a verbatim transcript of the audio payload.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, SpeechError>;

    /// Render text as raw PCM audio in the given voice.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<PcmAudio, SpeechError>;
}
