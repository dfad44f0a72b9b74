//! HeyGen avatar video client.
//!
//! Two entry operations: `generate_from_audio` uploads a pre-recorded audio
//! file as an asset and references it by URL; `generate_from_text` sends
//! inline text through HeyGen's built-in TTS. Both resolve a background
//! descriptor, submit a v2 generation job, poll the status endpoint through
//! the shared loop and download the finished video. Supplying a callback
//! URL on the text path skips polling entirely.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{AvatarDefaults, DEFAULT_SPEED};
use crate::download::download_to;
use crate::error::GenError;
use crate::media_type;
use crate::poll::{poll_until_terminal, PollConfig, PollError, PollStatus};

/// The environment variable name for the HeyGen API key.
pub const HEYGEN_API_KEY_ENV: &str = "HEYGEN_API_KEY";

/// Default base URL for the HeyGen API.
pub const HEYGEN_API_BASE_URL: &str = "https://api.heygen.com";

/// Default base URL for the HeyGen asset upload endpoint.
pub const HEYGEN_UPLOAD_BASE_URL: &str = "https://upload.heygen.com";

/// Default timeout for API requests (not downloads).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Polling budget for the text path: 5s interval, 20 minutes.
pub const TEXT_POLL: PollConfig = PollConfig::new(Duration::from_secs(5), 240);

/// Polling budget for the legacy audio path: 5s interval, 15 minutes.
pub const AUDIO_POLL: PollConfig = PollConfig::new(Duration::from_secs(5), 180);

/// Resolved background payload for a generation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    Color { value: String },
    Image { url: String },
}

#[derive(Debug, Serialize)]
struct GenerateVideoRequest {
    video_inputs: Vec<VideoInput>,
    dimension: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct VideoInput {
    character: Character,
    voice: VoiceInput,
    background: Background,
}

#[derive(Debug, Serialize)]
struct Character {
    #[serde(rename = "type")]
    kind: &'static str,
    avatar_id: String,
    avatar_style: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum VoiceInput {
    Text {
        input_text: String,
        voice_id: String,
        speed: f64,
    },
    Audio {
        audio_url: String,
    },
}

#[derive(Debug, Serialize)]
struct Dimension {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoResponse {
    #[serde(default)]
    data: Option<GenerateVideoData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoData {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    data: Option<StatusData>,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    #[serde(default)]
    status: String,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

/// Success payload for the avatar wrapper.
#[derive(Debug, Serialize)]
pub struct AvatarResult {
    pub video_path: String,
    pub video_url: String,
    pub video_id: String,
}

/// How an avatar generation call ended: the video was produced, or the job
/// was handed off to a webhook.
#[derive(Debug)]
pub enum AvatarGeneration {
    Completed(AvatarResult),
    Processing {
        video_id: String,
        callback_url: String,
    },
}

/// Per-request options; unset fields fall back to the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct AvatarOptions {
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub speed: Option<f64>,
    pub background: Option<String>,
    pub background_image: Option<String>,
    pub callback_url: Option<String>,
}

/// Client for the HeyGen video generation API.
pub struct HeygenClient {
    api_key: String,
    api_base_url: String,
    upload_base_url: String,
    defaults: AvatarDefaults,
    text_poll: PollConfig,
    audio_poll: PollConfig,
    http_client: reqwest::Client,
}

impl HeygenClient {
    /// Create a client by reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `GenError::MissingApiKey` if `HEYGEN_API_KEY` is not set; no
    /// network call is attempted.
    pub fn new(defaults: AvatarDefaults) -> Result<Self, GenError> {
        let api_key = std::env::var(HEYGEN_API_KEY_ENV).map_err(|_| GenError::MissingApiKey {
            var: HEYGEN_API_KEY_ENV,
        })?;
        Self::with_api_key(api_key, defaults)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(api_key: String, defaults: AvatarDefaults) -> Result<Self, GenError> {
        Self::with_base_urls(
            api_key,
            defaults,
            HEYGEN_API_BASE_URL.to_string(),
            HEYGEN_UPLOAD_BASE_URL.to_string(),
        )
    }

    /// Create a client with custom base URLs. Useful for testing against a
    /// mock server.
    pub fn with_base_urls(
        api_key: String,
        defaults: AvatarDefaults,
        api_base_url: String,
        upload_base_url: String,
    ) -> Result<Self, GenError> {
        if api_key.is_empty() {
            return Err(GenError::MissingApiKey {
                var: HEYGEN_API_KEY_ENV,
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            api_base_url,
            upload_base_url,
            defaults,
            text_poll: TEXT_POLL,
            audio_poll: AUDIO_POLL,
            http_client,
        })
    }

    /// Override both polling budgets (tests use millisecond intervals).
    pub fn with_poll_configs(mut self, text_poll: PollConfig, audio_poll: PollConfig) -> Self {
        self.text_poll = text_poll;
        self.audio_poll = audio_poll;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Generate an avatar video from inline text using HeyGen's built-in TTS.
    ///
    /// If `options.callback_url` is set, the job is submitted with the
    /// callback and this returns `AvatarGeneration::Processing` immediately;
    /// the polling loop never runs.
    pub async fn generate_from_text(
        &self,
        text: &str,
        output_path: &Path,
        options: &AvatarOptions,
    ) -> Result<AvatarGeneration, GenError> {
        if text.trim().is_empty() {
            return Err(GenError::MissingField("No text provided".to_string()));
        }

        let background = self
            .resolve_background(options.background.as_deref(), options.background_image.as_deref())
            .await?;

        let voice = VoiceInput::Text {
            input_text: text.to_string(),
            voice_id: options
                .voice_id
                .clone()
                .unwrap_or_else(|| self.defaults.voice_id.clone()),
            speed: options.speed.unwrap_or(DEFAULT_SPEED),
        };

        let video_id = self
            .submit(voice, background, options)
            .await?;
        log::info!("Video generation submitted, video_id: {}", video_id);

        if let Some(callback_url) = &options.callback_url {
            log::info!("Callback URL supplied; returning without polling");
            return Ok(AvatarGeneration::Processing {
                video_id,
                callback_url: callback_url.clone(),
            });
        }

        let result = self
            .wait_and_download(&video_id, output_path, self.text_poll)
            .await?;
        Ok(AvatarGeneration::Completed(result))
    }

    /// Generate an avatar video from a pre-recorded audio file (legacy path).
    ///
    /// The audio file is uploaded as a binary asset and referenced by URL.
    pub async fn generate_from_audio(
        &self,
        audio_path: &Path,
        output_path: &Path,
        options: &AvatarOptions,
    ) -> Result<AvatarGeneration, GenError> {
        if audio_path.as_os_str().is_empty() {
            return Err(GenError::MissingField("No audio_path provided".to_string()));
        }

        log::info!("Uploading audio asset: {}", audio_path.display());
        let audio_bytes = tokio::fs::read(audio_path).await?;
        let content_type = media_type::audio_content_type(audio_path);
        let audio_url = self.upload_asset(audio_bytes, content_type).await?;

        let background = self
            .resolve_background(options.background.as_deref(), options.background_image.as_deref())
            .await?;

        let video_id = self
            .submit(VoiceInput::Audio { audio_url }, background, options)
            .await?;
        log::info!("Video generation submitted, video_id: {}", video_id);

        let result = self
            .wait_and_download(&video_id, output_path, self.audio_poll)
            .await?;
        Ok(AvatarGeneration::Completed(result))
    }

    /// Resolve a background descriptor into a request payload.
    ///
    /// Order: a local `background_image` is uploaded as an asset (content
    /// type sniffed from the bytes); an `http(s)` image URL is used as-is;
    /// absent or `"newsroom"` descriptors yield the fixed newsroom color;
    /// any other descriptor is treated as a raw color value.
    pub async fn resolve_background(
        &self,
        background: Option<&str>,
        background_image: Option<&str>,
    ) -> Result<Background, GenError> {
        if let Some(image) = background_image.filter(|s| !s.trim().is_empty()) {
            if image.starts_with("http://") || image.starts_with("https://") {
                return Ok(Background::Image {
                    url: image.to_string(),
                });
            }

            let path = Path::new(image);
            let bytes = tokio::fs::read(path).await?;
            let content_type = media_type::image_content_type(path, &bytes);
            log::info!(
                "Uploading background image {} as {}",
                path.display(),
                content_type
            );
            let url = self.upload_asset(bytes, content_type).await?;
            return Ok(Background::Image { url });
        }

        match background {
            None | Some("newsroom") => Ok(Background::Color {
                value: self.defaults.background_color.clone(),
            }),
            Some(color) => Ok(Background::Color {
                value: color.to_string(),
            }),
        }
    }

    /// Upload raw bytes as a HeyGen asset and return the asset URL.
    pub async fn upload_asset(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GenError> {
        let url = format!("{}/v1/asset", self.upload_base_url);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Asset upload failed with status {}: {}",
                status, error_text
            )));
        }

        let upload: UploadResponse = response.json().await?;
        upload
            .data
            .map(|d| d.url)
            .ok_or_else(|| GenError::Api("No asset URL in upload response".to_string()))
    }

    /// Submit a generation job and return the vendor-issued video id.
    async fn submit(
        &self,
        voice: VoiceInput,
        background: Background,
        options: &AvatarOptions,
    ) -> Result<String, GenError> {
        let url = format!("{}/v2/video/generate", self.api_base_url);

        let request = GenerateVideoRequest {
            video_inputs: vec![VideoInput {
                character: Character {
                    kind: "avatar",
                    avatar_id: options
                        .avatar_id
                        .clone()
                        .unwrap_or_else(|| self.defaults.avatar_id.clone()),
                    avatar_style: "normal",
                },
                voice,
                background,
            }],
            dimension: Dimension {
                width: self.defaults.width,
                height: self.defaults.height,
            },
            callback_url: options.callback_url.clone(),
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Video generation request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateVideoResponse = response.json().await?;
        if let Some(error) = body.error.filter(|e| !e.is_null()) {
            return Err(GenError::Api(format!("Video generation rejected: {}", error)));
        }
        body.data
            .map(|d| d.video_id)
            .ok_or_else(|| GenError::Api("No video_id in response".to_string()))
    }

    /// Poll until the job reaches a terminal status, then download the video.
    async fn wait_and_download(
        &self,
        video_id: &str,
        output_path: &Path,
        poll: PollConfig,
    ) -> Result<AvatarResult, GenError> {
        log::info!(
            "Polling video status every {:?} (up to {} attempts)...",
            poll.interval,
            poll.max_attempts
        );

        let video_url = poll_until_terminal(poll, |_attempt| self.check_status(video_id))
            .await
            .map_err(|e| match e {
                PollError::Failed(message) => GenError::JobFailed(message),
                PollError::TimedOut => GenError::Timeout {
                    minutes: poll.budget_minutes(),
                    video_id: video_id.to_string(),
                    check_url: format!("https://app.heygen.com/videos/{}", video_id),
                },
                PollError::Fatal(err) => err,
            })?;

        log::info!("Video completed, downloading to {}", output_path.display());
        download_to(&self.http_client, &video_url, output_path).await?;

        Ok(AvatarResult {
            video_path: output_path.to_string_lossy().into_owned(),
            video_url,
            video_id: video_id.to_string(),
        })
    }

    /// One status probe for the shared polling loop.
    async fn check_status(&self, video_id: &str) -> Result<PollStatus<String>, GenError> {
        let url = format!(
            "{}/v1/video_status.get?video_id={}",
            self.api_base_url, video_id
        );

        let response = self
            .http_client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status_code = response.status();
        if status_code.is_server_error() {
            // Surface gateway errors as reqwest errors so the polling loop
            // can classify them as transient.
            if let Err(err) = response.error_for_status() {
                return Err(GenError::Http(err));
            }
            return Err(GenError::Api(format!(
                "Status check failed with status {}",
                status_code
            )));
        }
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Status check failed with status {}: {}",
                status_code, error_text
            )));
        }

        let body: StatusResponse = response.json().await?;
        let data = body
            .data
            .ok_or_else(|| GenError::Api("No data in status response".to_string()))?;

        match data.status.as_str() {
            "completed" => data
                .video_url
                .map(PollStatus::Completed)
                .ok_or(GenError::MissingResultUrl {
                    details: format!("status completed, video_id: {}", video_id),
                }),
            "failed" => {
                let detail = data
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Unknown error".to_string());
                Ok(PollStatus::Failed(detail))
            }
            _ => Ok(PollStatus::Pending),
        }
    }
}
