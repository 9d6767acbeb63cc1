#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use uuid::Uuid;
use voxgate_speech::{
    AudioArtifact, AudioStore, FileAudioStore, InMemoryAudioStore, SpeechConfig, Synthesizer,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAKE_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00fake-frames";

fn config_for(server: &MockServer) -> SpeechConfig {
    SpeechConfig {
        api_key: "xi-test".to_string(),
        api_base_url: Some(server.uri()),
        ..SpeechConfig::default()
    }
}

#[tokio::test]
async fn test_elevenlabs_request_shape_and_storage() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let voice_path = format!("/v1/text-to-speech/{}", config.voice.voice_id);

    Mock::given(method("POST"))
        .and(path(voice_path.as_str()))
        .and(header("xi-api-key", "xi-test"))
        .and(header("Accept", "audio/mpeg"))
        .and(body_partial_json(serde_json::json!({
            "text": "Hello from the temple.",
            "model_id": "eleven_turbo_v2_5",
            "voice_settings": {"stability": 0.5, "similarity_boost": 0.75}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryAudioStore::new());
    let synth = Synthesizer::new(config, store.clone());
    let id = Uuid::new_v4();

    let locator = synth.speak("Hello from the temple.", id).await.unwrap();
    assert_eq!(locator.size, FAKE_MP3.len());
    assert_eq!(locator.content_type, "audio/mpeg");

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.bytes, FAKE_MP3);
}

#[tokio::test]
async fn test_provider_error_yields_none_and_no_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryAudioStore::new());
    let synth = Synthesizer::new(config_for(&server), store.clone());
    let id = Uuid::new_v4();

    assert!(synth.speak("Hello", id).await.is_none());
    assert!(store.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_audio_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::<u8>::new()))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryAudioStore::new());
    let synth = Synthesizer::new(config_for(&server), store);
    assert!(synth.speak("Hello", Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn test_file_store_round_trip_and_delete() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileAudioStore::new(tmp.path().join("audio"), "audio/mpeg")
        .await
        .unwrap();
    let id = Uuid::new_v4();

    store
        .put(id, AudioArtifact::new(FAKE_MP3.to_vec(), "audio/mpeg"))
        .await
        .unwrap();
    assert!(tmp.path().join("audio").join(format!("{id}.mp3")).exists());

    let taken = store.take(id).await.unwrap().unwrap();
    assert_eq!(taken.bytes, FAKE_MP3);
    assert!(store.get(id).await.unwrap().is_none());
    assert!(!tmp.path().join("audio").join(format!("{id}.mp3")).exists());
}

#[tokio::test]
async fn test_file_store_replaces_previous_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileAudioStore::new(tmp.path().to_path_buf(), "audio/mpeg")
        .await
        .unwrap();
    let id = Uuid::new_v4();

    store
        .put(id, AudioArtifact::new(b"first".to_vec(), "audio/mpeg"))
        .await
        .unwrap();
    store
        .put(id, AudioArtifact::new(b"second".to_vec(), "audio/mpeg"))
        .await
        .unwrap();

    assert_eq!(store.get(id).await.unwrap().unwrap().bytes, b"second");
    let files = std::fs::read_dir(tmp.path()).unwrap().count();
    assert_eq!(files, 1);
}

#[tokio::test]
async fn test_file_store_rejects_other_codecs() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileAudioStore::new(tmp.path().to_path_buf(), "audio/mpeg")
        .await
        .unwrap();
    let result = store
        .put(Uuid::new_v4(), AudioArtifact::new(vec![0; 4], "audio/wav"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_file_store_delete_missing_is_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileAudioStore::new(tmp.path().to_path_buf(), "audio/mpeg")
        .await
        .unwrap();
    store.delete(Uuid::new_v4()).await.unwrap();
}
