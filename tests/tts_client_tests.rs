//! Mock HTTP tests for the Google Cloud TTS client.

use std::path::Path;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use media_gen::error::GenError;
use media_gen::tts::TtsClient;

fn client_for(server: &MockServer) -> TtsClient {
    TtsClient::with_base_url("test-api-key".to_string(), server.uri()).unwrap()
}

#[tokio::test]
async fn test_generate_audio_writes_exact_bytes() {
    let mock_server = MockServer::start().await;

    // "hello" base64-encoded
    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .and(header("X-Goog-Api-Key", "test-api-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": "aGVsbG8="
            })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp3");

    let result = client_for(&mock_server)
        .generate_audio("hello", &out, None, 1.0)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&out).unwrap(), b"hello");
    assert_eq!(result.audio_path, out.to_string_lossy());
    assert_eq!(result.provider, "google");
    assert_eq!(result.voice, "en-US-Neural2-F");
}

#[tokio::test]
async fn test_generate_audio_sends_voice_and_speed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .and(body_partial_json(serde_json::json!({
            "input": {"text": "breaking news"},
            "voice": {"languageCode": "en-US", "name": "en-US-Neural2-J"},
            "audioConfig": {"audioEncoding": "MP3", "speakingRate": 1.5}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": "aGVsbG8="
            })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp3");

    let result = client_for(&mock_server)
        .generate_audio("breaking news", &out, Some("en-US-Neural2-J"), 1.5)
        .await
        .unwrap();
    assert_eq!(result.voice, "en-US-Neural2-J");
}

#[tokio::test]
async fn test_generate_audio_api_error_propagates_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string("API key not valid"),
        )
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .generate_audio("hello", Path::new("/tmp/unused.mp3"), None, 1.0)
        .await;

    match result {
        Err(GenError::Api(msg)) => {
            assert!(msg.contains("403"));
            assert!(msg.contains("API key not valid"));
        }
        other => panic!("expected Api error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_generate_audio_invalid_base64_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": "!!!not-base64!!!"
            })),
        )
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .generate_audio("hello", Path::new("/tmp/unused.mp3"), None, 1.0)
        .await;

    match result {
        Err(GenError::Api(msg)) => assert!(msg.contains("Invalid audio content")),
        other => panic!("expected Api error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_empty_text_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .generate_audio("", Path::new("/tmp/unused.mp3"), None, 1.0)
        .await;

    match result {
        Err(GenError::MissingField(msg)) => assert_eq!(msg, "No text provided"),
        other => panic!("expected MissingField, got {:?}", other.map(|_| ())),
    }
}
