//! Request parsing: stdin JSON or positional command-line arguments.
//!
//! Each wrapper reads a JSON object from stdin when it is not attached to a
//! terminal (the orchestrator integration path), and falls back to
//! positional arguments otherwise. Malformed JSON becomes an error result,
//! never a crash.

use std::io::{IsTerminal, Read};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::defaults::{DEFAULT_DURATION_SECS, DEFAULT_FPS, DEFAULT_SPEED};
use crate::error::GenError;

/// Parse a raw JSON document into a request struct.
pub fn parse_request<T: DeserializeOwned>(raw: &str) -> Result<T, GenError> {
    serde_json::from_str(raw).map_err(|e| GenError::InvalidInput(e.to_string()))
}

/// Read a request from stdin if stdin is not an interactive terminal.
///
/// Returns `None` when stdin is a terminal, so the caller should use
/// command-line arguments instead.
pub fn stdin_request<T: DeserializeOwned>() -> Option<Result<T, GenError>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return None;
    }
    let mut raw = String::new();
    if let Err(e) = stdin.lock().read_to_string(&mut raw) {
        return Some(Err(GenError::Io(e)));
    }
    Some(parse_request(&raw))
}

/// Request for the TTS wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_audio_output")]
    pub output_path: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

/// Request for the fal.ai video wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoRequest {
    /// "text_to_video" or "image_to_video"
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default = "default_video_output")]
    pub output_path: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

/// Request for the HeyGen avatar wrapper.
///
/// `text` takes priority over `audio_path` when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvatarRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default = "default_video_output")]
    pub output_path: String,
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

fn default_audio_output() -> String {
    "output.mp3".to_string()
}

fn default_video_output() -> String {
    "output.mp4".to_string()
}

fn default_mode() -> String {
    "text_to_video".to_string()
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

/// Treat empty or whitespace-only strings as absent.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tts_request_with_defaults() {
        let req: TtsRequest = parse_request(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(req.text, "hello");
        assert_eq!(req.output_path, "output.mp3");
        assert!(req.voice.is_none());
        assert_eq!(req.speed, 1.0);
    }

    #[test]
    fn test_parse_tts_request_all_fields() {
        let req: TtsRequest = parse_request(
            r#"{"text":"hi","output_path":"a.mp3","voice":"en-US-Neural2-J","speed":1.2}"#,
        )
        .unwrap();
        assert_eq!(req.output_path, "a.mp3");
        assert_eq!(req.voice.as_deref(), Some("en-US-Neural2-J"));
        assert_eq!(req.speed, 1.2);
    }

    #[test]
    fn test_parse_malformed_json_is_invalid_input() {
        let result: Result<TtsRequest, _> = parse_request("{not json");
        match result {
            Err(GenError::InvalidInput(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_video_request_defaults() {
        let req: VideoRequest = parse_request(r#"{"prompt":"a sunrise"}"#).unwrap();
        assert_eq!(req.mode, "text_to_video");
        assert_eq!(req.output_path, "output.mp4");
        assert_eq!(req.duration, 5);
        assert_eq!(req.fps, 24);
        assert!(req.model.is_none());
    }

    #[test]
    fn test_parse_avatar_request_text_and_audio() {
        let req: AvatarRequest =
            parse_request(r#"{"text":"breaking news","audio_path":"a.mp3"}"#).unwrap();
        assert_eq!(req.text.as_deref(), Some("breaking news"));
        assert_eq!(req.audio_path.as_deref(), Some("a.mp3"));
        assert_eq!(req.output_path, "output.mp4");
    }

    #[test]
    fn test_non_empty_filters_blank_strings() {
        assert_eq!(non_empty(Some("hello")), Some("hello"));
        assert_eq!(non_empty(Some("  spaced  ")), Some("spaced"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
