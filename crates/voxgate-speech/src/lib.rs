//! Speech synthesis and audio artifact storage for voxgate.
//!
//! The [`Synthesizer`] turns assistant text into audio through a
//! [`SpeechBackend`] and writes the result into an [`AudioStore`] under the
//! call's session id, where the telephony provider fetches it for playback.
//! At most one artifact exists per session; a new utterance replaces the
//! previous one.

pub mod config;
pub mod store;
pub mod tts;

pub use config::{SpeechConfig, VoiceProfile};
pub use store::{AudioArtifact, AudioStore, FileAudioStore, InMemoryAudioStore};
pub use tts::{AudioLocator, ElevenLabsBackend, SpeechBackend, Synthesizer};
