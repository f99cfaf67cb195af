//! Single-shot microphone transcription

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::capture::{SAMPLE_RATE, capture_utterance, samples_to_wav};
use super::stt::SpeechToText;
use crate::config::{ApiKeys, SttProviderKind, VoiceConfig};
use crate::{Error, Result};

/// Produces the text of one spoken utterance
///
/// Failures are not surfaced: every failure mode is logged and yields an
/// empty string.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Capture and recognize one utterance
    async fn transcribe(&self) -> String;
}

/// Records from the default input device and sends the audio to a recognizer
///
/// Each call monopolizes the input device until the utterance ends. Calls
/// are not serialized against each other.
pub struct MicrophoneTranscriber {
    stt: Option<SpeechToText>,
}

impl MicrophoneTranscriber {
    /// Create a transcriber; `None` means no recognizer is configured
    #[must_use]
    pub const fn new(stt: Option<SpeechToText>) -> Self {
        Self { stt }
    }

    /// Build the configured recognizer if its credential is present
    #[must_use]
    pub fn from_config(voice: &VoiceConfig, keys: &ApiKeys, openai_base_url: &str) -> Self {
        let clone_key = |key: &SecretString| SecretString::from(key.expose_secret().to_owned());

        let stt = match voice.stt_provider {
            SttProviderKind::Whisper => keys.openai.as_ref().map(|key| {
                SpeechToText::new_whisper(clone_key(key), voice.stt_model.clone(), openai_base_url)
            }),
            SttProviderKind::Deepgram => keys
                .deepgram
                .as_ref()
                .map(|key| SpeechToText::new_deepgram(clone_key(key), voice.stt_model.clone())),
        };

        if stt.is_none() {
            tracing::warn!(
                provider = ?voice.stt_provider,
                "no API key for speech recognizer, voice input will yield no text"
            );
        }

        Self::new(stt)
    }

    async fn try_transcribe(&self) -> Result<String> {
        let stt = self
            .stt
            .as_ref()
            .ok_or_else(|| Error::Config("no speech recognizer configured".to_string()))?;

        let samples = tokio::task::spawn_blocking(capture_utterance)
            .await
            .map_err(|e| Error::Audio(format!("capture task failed: {e}")))??;

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        stt.transcribe(&wav).await
    }
}

#[async_trait]
impl Transcriber for MicrophoneTranscriber {
    async fn transcribe(&self) -> String {
        match self.try_transcribe().await {
            Ok(text) => text,
            Err(Error::Unintelligible) => {
                tracing::error!("speech recognizer could not understand the audio");
                String::new()
            }
            Err(e @ Error::Audio(_)) => {
                tracing::error!(error = %e, "could not capture audio");
                String::new()
            }
            Err(e @ Error::Config(_)) => {
                tracing::error!(error = %e, "speech recognition unavailable");
                String::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "could not request results from speech recognizer");
                String::new()
            }
        }
    }
}
