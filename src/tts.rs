//! Google Cloud Text-to-Speech client.
//!
//! One synchronous REST call: the synthesized audio comes back inline as
//! base64, so there is no job polling here.

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_TTS_VOICE;
use crate::error::GenError;

/// The environment variable name for the Google TTS API key.
pub const GOOGLE_TTS_API_KEY_ENV: &str = "GOOGLE_TTS_API_KEY";

/// Default base URL for the Google Cloud TTS API.
pub const GOOGLE_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com";

/// Default timeout for synthesis requests.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
struct VoiceSelection {
    #[serde(rename = "languageCode")]
    language_code: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    audio_encoding: &'static str,
    #[serde(rename = "speakingRate")]
    speaking_rate: f64,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    /// Base64-encoded audio bytes.
    #[serde(rename = "audioContent")]
    audio_content: String,
}

/// Success payload for the TTS wrapper.
#[derive(Debug, Serialize)]
pub struct TtsOutput {
    pub audio_path: String,
    pub provider: &'static str,
    pub voice: String,
}

/// Client for the Google Cloud Text-to-Speech REST API.
pub struct TtsClient {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl TtsClient {
    /// Create a client by reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `GenError::MissingApiKey` if `GOOGLE_TTS_API_KEY` is not set.
    pub fn new() -> Result<Self, GenError> {
        let api_key = std::env::var(GOOGLE_TTS_API_KEY_ENV).map_err(|_| {
            GenError::MissingApiKey {
                var: GOOGLE_TTS_API_KEY_ENV,
            }
        })?;
        Self::with_api_key(api_key)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, GenError> {
        Self::with_base_url(api_key, GOOGLE_TTS_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL. Useful for testing against a
    /// mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, GenError> {
        if api_key.is_empty() {
            return Err(GenError::MissingApiKey {
                var: GOOGLE_TTS_API_KEY_ENV,
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(SYNTHESIS_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Synthesize `text` to MP3 and write the audio bytes to `output_path`.
    ///
    /// `voice` defaults to a professional news voice; `speed` is the
    /// speaking-rate multiplier (1.0 = normal).
    ///
    /// # Errors
    ///
    /// Returns `GenError::MissingField` for empty text (no network call is
    /// made), `GenError::Api` for upstream error responses or an
    /// undecodable audio payload, `GenError::Http` for request failures and
    /// `GenError::Io` if the file cannot be written.
    pub async fn generate_audio(
        &self,
        text: &str,
        output_path: &Path,
        voice: Option<&str>,
        speed: f64,
    ) -> Result<TtsOutput, GenError> {
        if text.trim().is_empty() {
            return Err(GenError::MissingField("No text provided".to_string()));
        }

        let voice = voice.unwrap_or(DEFAULT_TTS_VOICE).to_string();
        log::info!("Generating audio with Google Cloud TTS (voice: {})", voice);

        let url = format!("{}/v1/text:synthesize", self.base_url);
        let request_body = SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: "en-US".to_string(),
                name: voice.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: speed,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Synthesis failed with status {}: {}",
                status, error_text
            )));
        }

        let synth: SynthesizeResponse = response.json().await?;
        let audio_bytes = BASE64
            .decode(&synth.audio_content)
            .map_err(|e| GenError::Api(format!("Invalid audio content in response: {}", e)))?;

        tokio::fs::write(output_path, &audio_bytes).await?;
        log::info!("Audio saved to {}", output_path.display());

        Ok(TtsOutput {
            audio_path: output_path.to_string_lossy().into_owned(),
            provider: "google",
            voice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_creates_client() {
        let client = TtsClient::with_api_key("test-key".to_string()).unwrap();
        assert_eq!(client.base_url(), GOOGLE_TTS_BASE_URL);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = TtsClient::with_api_key("".to_string());
        assert!(matches!(
            result,
            Err(GenError::MissingApiKey {
                var: GOOGLE_TTS_API_KEY_ENV
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_any_request() {
        // base_url points nowhere; an attempted request would error with Http,
        // not MissingField
        let client =
            TtsClient::with_base_url("key".to_string(), "http://localhost:1".to_string()).unwrap();
        let result = client
            .generate_audio("   ", Path::new("out.mp3"), None, 1.0)
            .await;
        assert!(matches!(result, Err(GenError::MissingField(_))));
    }

    #[test]
    fn test_synthesize_request_serialization() {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: "hello".to_string(),
            },
            voice: VoiceSelection {
                language_code: "en-US".to_string(),
                name: "en-US-Neural2-F".to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: 1.25,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"]["text"], "hello");
        assert_eq!(json["voice"]["languageCode"], "en-US");
        assert_eq!(json["voice"]["name"], "en-US-Neural2-F");
        assert_eq!(json["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(json["audioConfig"]["speakingRate"], 1.25);
    }

    #[test]
    fn test_synthesize_response_deserialization() {
        let json = r#"{"audioContent": "aGVsbG8="}"#;
        let response: SynthesizeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.audio_content, "aGVsbG8=");
        assert_eq!(BASE64.decode(&response.audio_content).unwrap(), b"hello");
    }
}
