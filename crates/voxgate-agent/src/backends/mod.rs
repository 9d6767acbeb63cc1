pub mod openai;

use async_trait::async_trait;
use voxgate_core::{Turn, VoxgateResult};

/// Trait for chat-completion backends.
///
/// A backend returns the provider's raw reply text. Interpreting that text
/// (including the hand-off sentinel) is the job of
/// [`Assistant`](crate::Assistant).
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Complete the conversation described by `transcript`.
    async fn complete(
        &self,
        transcript: &[Turn],
        max_tokens: u32,
        temperature: f32,
    ) -> VoxgateResult<String>;
}
