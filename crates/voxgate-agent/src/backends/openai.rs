use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use async_trait::async_trait;
use voxgate_core::{Turn, VoxgateError, VoxgateResult};

/// OpenAI-compatible chat completions backend.
///
/// Works with OpenAI, OpenRouter, Groq, and any other provider that
/// implements the `/v1/chat/completions` API.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_messages(&self, transcript: &[Turn]) -> Vec<serde_json::Value> {
        transcript
            .iter()
            .map(|t| {
                serde_json::json!({
                    "role": t.role.as_str(),
                    "content": t.content,
                })
            })
            .collect()
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter requires extra headers
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request.header("X-Title", "voxgate")
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(
        &self,
        transcript: &[Turn],
        max_tokens: u32,
        temperature: f32,
    ) -> VoxgateResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());

        let body = serde_json::json!({
            "model": self.config.model_id,
            "messages": self.build_messages(transcript),
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let resp = self
            .add_provider_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| VoxgateError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| VoxgateError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(VoxgateError::Http(format!(
                "chat completion error {status}: {resp_body}"
            )));
        }

        parse_openai_response(&resp_body)
    }
}

/// Extract the first choice's message text from a chat completion body.
pub fn parse_openai_response(body: &serde_json::Value) -> VoxgateResult<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| VoxgateError::Agent("completion carried no message content".to_string()))
}
