use serde::{Deserialize, Serialize};

/// Synthetic voice used for every assistant utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceProfile {
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
}

/// Speech provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub api_key: String,
    pub api_base_url: Option<String>,
    #[serde(flatten)]
    pub voice: VoiceProfile,
    /// MIME type requested from the provider and served on playback.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_voice_id() -> String {
    "cgSgspJ2msm6clMCkdW9".to_string()
}

fn default_model_id() -> String {
    "eleven_turbo_v2_5".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_content_type() -> String {
    "audio/mpeg".to_string()
}

fn default_timeout_secs() -> u64 {
    8
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: None,
            voice: VoiceProfile::default(),
            content_type: default_content_type(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SpeechConfig {
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or("https://api.elevenlabs.io")
    }
}
