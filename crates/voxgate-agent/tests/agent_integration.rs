#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Exercises the OpenAI-compatible backend against a mock provider.

use voxgate_agent::{AgentReply, Assistant, ModelConfig};
use voxgate_core::Turn;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, timeout_secs: u64) -> ModelConfig {
    ModelConfig {
        api_key: "sk-test".to_string(),
        api_base_url: Some(server.uri()),
        timeout_secs,
        ..ModelConfig::default()
    }
}

fn completion(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}

fn transcript() -> Vec<Turn> {
    vec![
        Turn::system("You are a temple phone assistant."),
        Turn::assistant("Hello, how can I help?"),
        Turn::user("When is the evening aarti?"),
    ]
}

#[tokio::test]
async fn test_reply_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4",
            "max_tokens": 50,
            "messages": [
                {"role": "system", "content": "You are a temple phone assistant."},
                {"role": "assistant", "content": "Hello, how can I help?"},
                {"role": "user", "content": "When is the evening aarti?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Aarti is at 7 PM.")))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = Assistant::new(config_for(&server, 5));
    let reply = assistant.reply(&transcript()).await;
    assert_eq!(reply, AgentReply::Reply("Aarti is at 7 PM.".to_string()));
}

#[tokio::test]
async fn test_sentinel_becomes_escalate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("TRANSFER_TO_MANAGER")))
        .mount(&server)
        .await;

    let assistant = Assistant::new(config_for(&server, 5));
    assert_eq!(assistant.reply(&transcript()).await, AgentReply::Escalate);
}

#[tokio::test]
async fn test_provider_error_becomes_escalate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"error": {"message": "overloaded"}})),
        )
        .mount(&server)
        .await;

    let assistant = Assistant::new(config_for(&server, 5));
    assert_eq!(assistant.reply(&transcript()).await, AgentReply::Escalate);
}

#[tokio::test]
async fn test_unreachable_provider_becomes_escalate() {
    let config = ModelConfig {
        // Non-routable port so the HTTP client fails fast
        api_base_url: Some("http://127.0.0.1:1".to_string()),
        ..ModelConfig::default()
    };
    let assistant = Assistant::new(config);
    assert_eq!(assistant.reply(&transcript()).await, AgentReply::Escalate);
}

#[tokio::test]
async fn test_slow_provider_becomes_escalate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let assistant = Assistant::new(config_for(&server, 1));
    assert_eq!(assistant.reply(&transcript()).await, AgentReply::Escalate);
}
