use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::ModelConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use voxgate_core::{Turn, VoxgateError};

/// Literal reply the system prompt instructs the model to give when the call
/// should go to a human.
pub const ESCALATION_SENTINEL: &str = "TRANSFER_TO_MANAGER";

/// What the assistant wants to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    /// Say this to the caller.
    Reply(String),
    /// Hand the caller to a human operator.
    Escalate,
}

/// Language model adapter used by the IVR controller.
///
/// Never returns an error: provider failures, timeouts and empty replies all
/// become [`AgentReply::Escalate`] so a caller is never stranded on a backend
/// problem.
pub struct Assistant {
    backend: Arc<dyn LlmBackend>,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl Assistant {
    pub fn new(config: ModelConfig) -> Self {
        let max_tokens = config.max_tokens;
        let temperature = config.temperature;
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            backend: Arc::new(OpenAiBackend::new(config)),
            max_tokens,
            temperature,
            timeout,
        }
    }

    /// Create from a pre-built backend (custom providers, tests).
    pub fn from_backend(
        backend: Arc<dyn LlmBackend>,
        max_tokens: u32,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            max_tokens,
            temperature,
            timeout,
        }
    }

    /// Ask for the next assistant line given the full call transcript.
    pub async fn reply(&self, transcript: &[Turn]) -> AgentReply {
        let started = std::time::Instant::now();
        let outcome = tokio::time::timeout(
            self.timeout,
            self.backend
                .complete(transcript, self.max_tokens, self.temperature),
        )
        .await
        .unwrap_or(Err(VoxgateError::Timeout(self.timeout.as_secs())));

        match outcome {
            Ok(text) => {
                let reply = interpret(&text);
                info!(
                    turns = transcript.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    escalate = matches!(reply, AgentReply::Escalate),
                    "Language model replied"
                );
                reply
            }
            Err(e) => {
                warn!(error = %e, "Language model call failed, escalating");
                AgentReply::Escalate
            }
        }
    }
}

/// Translate raw provider text into an [`AgentReply`].
pub fn interpret(text: &str) -> AgentReply {
    let trimmed = text.trim();
    if trimmed == ESCALATION_SENTINEL {
        AgentReply::Escalate
    } else if trimmed.is_empty() {
        warn!("Language model returned an empty reply, escalating");
        AgentReply::Escalate
    } else {
        AgentReply::Reply(trimmed.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use voxgate_core::VoxgateResult;

    struct FixedBackend(VoxgateResult<String>);

    #[async_trait]
    impl LlmBackend for FixedBackend {
        async fn complete(&self, _: &[Turn], _: u32, _: f32) -> VoxgateResult<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(VoxgateError::Http(e.to_string())),
            }
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl LlmBackend for SlowBackend {
        async fn complete(&self, _: &[Turn], _: u32, _: f32) -> VoxgateResult<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".into())
        }
    }

    fn assistant(backend: impl LlmBackend + 'static) -> Assistant {
        Assistant::from_backend(Arc::new(backend), 50, 0.7, Duration::from_secs(2))
    }

    #[test]
    fn test_interpret_sentinel() {
        assert_eq!(interpret("TRANSFER_TO_MANAGER"), AgentReply::Escalate);
        assert_eq!(interpret(" TRANSFER_TO_MANAGER\n"), AgentReply::Escalate);
    }

    #[test]
    fn test_interpret_sentinel_must_be_whole_reply() {
        assert_eq!(
            interpret("I will TRANSFER_TO_MANAGER now"),
            AgentReply::Reply("I will TRANSFER_TO_MANAGER now".into())
        );
    }

    #[test]
    fn test_interpret_empty_escalates() {
        assert_eq!(interpret("   "), AgentReply::Escalate);
    }

    #[tokio::test]
    async fn test_reply_passes_text_through() {
        let a = assistant(FixedBackend(Ok("Puja bookings open at 9.".into())));
        let reply = a.reply(&[Turn::user("hi")]).await;
        assert_eq!(reply, AgentReply::Reply("Puja bookings open at 9.".into()));
    }

    #[tokio::test]
    async fn test_backend_error_escalates() {
        let a = assistant(FixedBackend(Err(VoxgateError::Http("503".into()))));
        assert_eq!(a.reply(&[Turn::user("hi")]).await, AgentReply::Escalate);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_escalates() {
        let a = assistant(SlowBackend);
        assert_eq!(a.reply(&[Turn::user("hi")]).await, AgentReply::Escalate);
    }
}
