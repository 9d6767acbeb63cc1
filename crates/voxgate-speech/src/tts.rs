use crate::config::{SpeechConfig, VoiceProfile};
use crate::store::{AudioArtifact, AudioStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use voxgate_core::{SessionId, VoxgateError, VoxgateResult};

/// Maximum text input size for one synthesis request. Assistant replies are
/// a couple of lines; anything larger is a bug upstream.
const MAX_TTS_INPUT_BYTES: usize = 4 * 1024;

/// Trait for text-to-speech providers.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Render `text` in the given voice, returning encoded audio bytes.
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> VoxgateResult<Vec<u8>>;
}

/// ElevenLabs text-to-speech backend.
pub struct ElevenLabsBackend {
    config: SpeechConfig,
    http: reqwest::Client,
}

impl ElevenLabsBackend {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SpeechBackend for ElevenLabsBackend {
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> VoxgateResult<Vec<u8>> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoxgateError::Speech(format!(
                "text exceeds maximum size: {} bytes (limit: {MAX_TTS_INPUT_BYTES} bytes)",
                text.len()
            )));
        }

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url(),
            voice.voice_id
        );
        let body = serde_json::json!({
            "text": text,
            "model_id": voice.model_id,
            "voice_settings": {
                "stability": voice.stability,
                "similarity_boost": voice.similarity_boost,
            },
        });

        let resp = self
            .http
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", &self.config.content_type)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoxgateError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(VoxgateError::Speech(format!(
                "text-to-speech error {status}: {error_body}"
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| VoxgateError::Http(e.to_string()))?;
        if bytes.is_empty() {
            return Err(VoxgateError::Speech("provider returned no audio".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

/// Where a freshly synthesized utterance can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioLocator {
    pub session_id: SessionId,
    pub content_type: String,
    pub size: usize,
}

/// Speech synthesis adapter used by the IVR controller.
///
/// Returns `None` on any failure; callers fall back to the telephony
/// provider's own text-to-speech.
pub struct Synthesizer {
    backend: Arc<dyn SpeechBackend>,
    store: Arc<dyn AudioStore>,
    voice: VoiceProfile,
    content_type: String,
    timeout: Duration,
}

impl Synthesizer {
    pub fn new(config: SpeechConfig, store: Arc<dyn AudioStore>) -> Self {
        let voice = config.voice.clone();
        let content_type = config.content_type.clone();
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            backend: Arc::new(ElevenLabsBackend::new(config)),
            store,
            voice,
            content_type,
            timeout,
        }
    }

    /// Create from a pre-built backend (custom providers, tests).
    pub fn from_backend(
        backend: Arc<dyn SpeechBackend>,
        store: Arc<dyn AudioStore>,
        voice: VoiceProfile,
        content_type: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            voice,
            content_type: content_type.into(),
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn AudioStore> {
        &self.store
    }

    /// Synthesize `text` and store it as the session's current artifact.
    pub async fn speak(&self, text: &str, session_id: SessionId) -> Option<AudioLocator> {
        match self.try_speak(text, session_id).await {
            Ok(locator) => {
                info!(
                    session_id = %session_id,
                    bytes = locator.size,
                    "Synthesized utterance"
                );
                Some(locator)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Speech synthesis failed");
                None
            }
        }
    }

    async fn try_speak(&self, text: &str, session_id: SessionId) -> VoxgateResult<AudioLocator> {
        let bytes = tokio::time::timeout(self.timeout, self.backend.synthesize(text, &self.voice))
            .await
            .map_err(|_| VoxgateError::Timeout(self.timeout.as_secs()))??;

        let size = bytes.len();
        self.store
            .put(session_id, AudioArtifact::new(bytes, self.content_type.clone()))
            .await?;

        Ok(AudioLocator {
            session_id,
            content_type: self.content_type.clone(),
            size,
        })
    }
}
