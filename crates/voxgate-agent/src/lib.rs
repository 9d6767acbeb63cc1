//! Language model adapter for voxgate.
//!
//! [`Assistant`] asks a chat-completion backend for the next thing to say to
//! the caller and folds every failure mode (transport error, provider error,
//! timeout, explicit hand-off request) into [`AgentReply::Escalate`], so the
//! IVR controller never sees an error from this layer.

pub mod assistant;
pub mod backends;
pub mod config;

pub use assistant::{AgentReply, Assistant, ESCALATION_SENTINEL};
pub use backends::openai::OpenAiBackend;
pub use backends::LlmBackend;
pub use config::{LlmProvider, ModelConfig};
