use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use voxgate_agent::ModelConfig;
use voxgate_core::{VoxgateError, VoxgateResult};
use voxgate_gateway::CallScript;
use voxgate_speech::SpeechConfig;

/// Top-level `voxgate.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct VoxgateConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub voice: SpeechConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub call: CallScript,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin the telephony provider uses to reach this server.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

/// Where synthesized audio waits until the provider fetches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub backend: AudioBackend,
    #[serde(default = "default_audio_dir")]
    pub dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: AudioBackend::default(),
            dir: default_audio_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Idle lifetime of a call session and of its cookie.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_audio_dir() -> PathBuf {
    PathBuf::from("./audio")
}
fn default_ttl_secs() -> u64 {
    30 * 60
}
fn default_sweep_interval_secs() -> u64 {
    60
}

impl VoxgateConfig {
    /// Load the config file, falling back to defaults when it does not
    /// exist, then apply environment overrides.
    pub fn load(path: &Path) -> VoxgateResult<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> VoxgateResult<Self> {
        toml::from_str(contents).map_err(|e| VoxgateError::Config(e.to_string()))
    }

    /// Environment overrides:
    /// - `VOXGATE_HOST` overrides `server.host`
    /// - `VOXGATE_PORT` overrides `server.port`
    /// - `VOXGATE_PUBLIC_URL` overrides `server.public_url`
    /// - `OPENAI_API_KEY` overrides `model.api_key`
    /// - `ELEVENLABS_API_KEY` overrides `voice.api_key`
    /// - `VOXGATE_OPERATOR_NUMBER` overrides `call.operator_number`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("VOXGATE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("VOXGATE_PORT") {
            match port.parse() {
                Ok(parsed) => self.server.port = parsed,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid VOXGATE_PORT"),
            }
        }
        if let Some(url) = lookup("VOXGATE_PUBLIC_URL") {
            self.server.public_url = Some(url);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.model.api_key = key;
        }
        if let Some(key) = lookup("ELEVENLABS_API_KEY") {
            self.voice.api_key = key;
        }
        if let Some(number) = lookup("VOXGATE_OPERATOR_NUMBER") {
            self.call.operator_number = number;
        }
    }

    /// Settings that let the server start but degrade every call.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.model.api_key.is_empty() {
            out.push("model.api_key is empty: every caller utterance will escalate");
        }
        if self.voice.api_key.is_empty() {
            out.push("voice.api_key is empty: replies fall back to provider text-to-speech");
        }
        if self.call.operator_number.is_empty() {
            out.push("call.operator_number is empty: transfers cannot connect");
        }
        out
    }
}
