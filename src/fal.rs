//! fal.ai video generation client.
//!
//! Supports text-to-video and image-to-video through the fal queue API:
//! submit a job, poll its status until it resolves, fetch the response
//! payload and download the resulting clip.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::download::download_to;
use crate::error::GenError;
use crate::media_type;
use crate::poll::{poll_until_terminal, PollConfig, PollError, PollStatus};

/// The environment variable name for the fal.ai API key.
pub const FAL_API_KEY_ENV: &str = "FAL_KEY";

/// Default base URL for the fal.ai queue API.
pub const FAL_QUEUE_BASE_URL: &str = "https://queue.fal.run";

/// Default base URL for the fal.ai REST API (storage uploads).
pub const FAL_REST_BASE_URL: &str = "https://rest.alpha.fal.ai";

/// Default timeout for API requests (not downloads).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default polling budget: 2s interval, 120s total.
pub const DEFAULT_POLL: PollConfig = PollConfig::new(Duration::from_secs(2), 60);

/// Arguments submitted with a generation job.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    /// Sent in text mode only; image mode lets the model pick.
    #[serde(skip_serializing_if = "Option::is_none")]
    num_frames: Option<u32>,
    num_inference_steps: u32,
    guidance_scale: f64,
}

/// Response from queue submission.
#[derive(Debug, Deserialize)]
pub struct QueueResponse {
    /// The unique request ID for polling.
    pub request_id: String,
}

/// Response from the status polling endpoint.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

/// Completed job payload. The video URL appears in one of two shapes
/// depending on the model; decode both and prefer the nested one.
#[derive(Debug, Deserialize)]
struct ResultResponse {
    #[serde(default)]
    video: Option<VideoFile>,
    #[serde(default)]
    video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    url: String,
}

impl ResultResponse {
    /// Fallback order: `video.url` first, then `video_url`.
    fn into_video_url(self) -> Option<String> {
        self.video.map(|v| v.url).or(self.video_url)
    }
}

/// Response from the storage upload initiation endpoint.
#[derive(Debug, Deserialize)]
struct InitiateUploadResponse {
    upload_url: String,
    file_url: String,
}

/// Success payload for the video wrapper.
#[derive(Debug, Serialize)]
pub struct VideoResult {
    pub video_path: String,
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
}

/// Client for the fal.ai queue and storage APIs.
pub struct FalClient {
    api_key: String,
    queue_base_url: String,
    rest_base_url: String,
    model: String,
    poll: PollConfig,
    http_client: reqwest::Client,
}

impl FalClient {
    /// Create a client by reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `GenError::MissingApiKey` if `FAL_KEY` is not set.
    pub fn new(model: String) -> Result<Self, GenError> {
        let api_key = std::env::var(FAL_API_KEY_ENV).map_err(|_| GenError::MissingApiKey {
            var: FAL_API_KEY_ENV,
        })?;
        Self::with_api_key(api_key, model)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(api_key: String, model: String) -> Result<Self, GenError> {
        Self::with_base_urls(
            api_key,
            model,
            FAL_QUEUE_BASE_URL.to_string(),
            FAL_REST_BASE_URL.to_string(),
        )
    }

    /// Create a client with custom base URLs. Useful for testing against a
    /// mock server.
    pub fn with_base_urls(
        api_key: String,
        model: String,
        queue_base_url: String,
        rest_base_url: String,
    ) -> Result<Self, GenError> {
        if api_key.is_empty() {
            return Err(GenError::MissingApiKey {
                var: FAL_API_KEY_ENV,
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            queue_base_url,
            rest_base_url,
            model,
            poll: DEFAULT_POLL,
            http_client,
        })
    }

    /// Override the polling interval and attempt budget.
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn queue_base_url(&self) -> &str {
        &self.queue_base_url
    }

    /// Generate a video from a text prompt and download it to `output_path`.
    pub async fn text_to_video(
        &self,
        prompt: &str,
        output_path: &Path,
        duration: u32,
        fps: u32,
    ) -> Result<VideoResult, GenError> {
        if prompt.trim().is_empty() {
            return Err(GenError::MissingField("No prompt provided".to_string()));
        }

        let num_frames = frame_count(duration, fps)?;

        log::info!(
            "Generating video from prompt: {}...",
            truncate(prompt, 50)
        );

        let video_url = self
            .generate(GenerateRequest {
                prompt: prompt.to_string(),
                image_url: None,
                num_frames: Some(num_frames),
                num_inference_steps: 30,
                guidance_scale: 3.0,
            })
            .await?;

        log::info!("Downloading video to {}", output_path.display());
        download_to(&self.http_client, &video_url, output_path).await?;

        Ok(VideoResult {
            video_path: output_path.to_string_lossy().into_owned(),
            video_url,
            duration: Some(duration),
            fps: Some(fps),
        })
    }

    /// Generate a video animating a local image, with motion described by
    /// `prompt`, and download it to `output_path`.
    ///
    /// The image is uploaded to fal storage first and referenced by URL.
    /// Frame count is left to the model in this mode.
    pub async fn image_to_video(
        &self,
        image_path: &Path,
        prompt: &str,
        output_path: &Path,
    ) -> Result<VideoResult, GenError> {
        if prompt.trim().is_empty() {
            return Err(GenError::MissingField("No prompt provided".to_string()));
        }

        log::info!("Generating video from image: {}", image_path.display());
        let image_url = self.upload_file(image_path).await?;

        let video_url = self
            .generate(GenerateRequest {
                prompt: prompt.to_string(),
                image_url: Some(image_url),
                num_frames: None,
                num_inference_steps: 30,
                guidance_scale: 3.0,
            })
            .await?;

        log::info!("Downloading video to {}", output_path.display());
        download_to(&self.http_client, &video_url, output_path).await?;

        Ok(VideoResult {
            video_path: output_path.to_string_lossy().into_owned(),
            video_url,
            duration: None,
            fps: None,
        })
    }

    /// Submit, wait for resolution and return the result video URL.
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenError> {
        let queued = self.submit(&request).await?;
        log::info!("Generation submitted, request_id: {}", queued.request_id);

        log::info!("Waiting for video generation...");
        let request_id = queued.request_id.clone();
        poll_until_terminal(self.poll, |_attempt| self.check_status(&request_id))
            .await
            .map_err(|e| match e {
                PollError::Failed(message) => GenError::JobFailed(message),
                PollError::TimedOut => GenError::Timeout {
                    minutes: self.poll.budget_minutes(),
                    video_id: queued.request_id.clone(),
                    check_url: format!(
                        "{}/{}/requests/{}/status",
                        self.queue_base_url, self.model, queued.request_id
                    ),
                },
                PollError::Fatal(err) => err,
            })?;

        self.fetch_result(&queued.request_id).await
    }

    /// Submit a generation job to the fal.ai queue.
    async fn submit(&self, request: &GenerateRequest) -> Result<QueueResponse, GenError> {
        let url = format!("{}/{}", self.queue_base_url, self.model);

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Submission failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }

    /// One status probe for the shared polling loop.
    async fn check_status(&self, request_id: &str) -> Result<PollStatus<()>, GenError> {
        let url = format!(
            "{}/{}/requests/{}/status",
            self.queue_base_url, self.model, request_id
        );

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Key {}", self.api_key))
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
            let status = status_code;
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Status check failed with status {}: {}",
                status, error_text
            )));
        }

        let status: StatusResponse = response.json().await?;
        match status.status.to_uppercase().as_str() {
            "COMPLETED" | "OK" => Ok(PollStatus::Completed(())),
            "FAILED" | "ERROR" => Ok(PollStatus::Failed(
                status
                    .error
                    .unwrap_or_else(|| "Unknown error occurred during generation".to_string()),
            )),
            _ => Ok(PollStatus::Pending),
        }
    }

    /// Fetch the completed job payload and extract the video URL.
    ///
    /// The absence of a resolvable URL is an error carrying the raw response
    /// body for diagnosis.
    async fn fetch_result(&self, request_id: &str) -> Result<String, GenError> {
        let url = format!(
            "{}/{}/requests/{}",
            self.queue_base_url, self.model, request_id
        );

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Result fetch failed with status {}: {}",
                status, error_text
            )));
        }

        let raw = response.text().await?;
        let result: ResultResponse = serde_json::from_str(&raw)
            .map_err(|_| GenError::MissingResultUrl {
                details: raw.clone(),
            })?;

        result
            .into_video_url()
            .ok_or(GenError::MissingResultUrl { details: raw })
    }

    /// Upload a local file to fal storage and return its public URL.
    ///
    /// Two steps: initiate the upload to get a signed URL, then PUT the
    /// bytes to it.
    pub async fn upload_file(&self, path: &Path) -> Result<String, GenError> {
        let bytes = tokio::fs::read(path).await?;
        let content_type = media_type::image_content_type(path, &bytes);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.jpg");

        let initiate_url = format!("{}/storage/upload/initiate", self.rest_base_url);
        let response = self
            .http_client
            .post(&initiate_url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&serde_json::json!({
                "content_type": content_type,
                "file_name": file_name,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenError::Api(format!(
                "Upload initiation failed with status {}: {}",
                status, error_text
            )));
        }

        let initiated: InitiateUploadResponse = response.json().await?;

        let put_response = self
            .http_client
            .put(&initiated.upload_url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !put_response.status().is_success() {
            return Err(GenError::Api(format!(
                "Upload failed with status {}",
                put_response.status()
            )));
        }

        Ok(initiated.file_url)
    }
}

/// Frame count for the text path. Duration and fps arrive from untrusted
/// JSON, so the product must not wrap.
fn frame_count(duration: u32, fps: u32) -> Result<u32, GenError> {
    duration.checked_mul(fps).ok_or_else(|| {
        GenError::MissingField(format!(
            "duration ({}) x fps ({}) exceeds the supported frame count",
            duration, fps
        ))
    })
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DEFAULT_FAL_MODEL;

    fn test_client() -> FalClient {
        FalClient::with_api_key("test-key".to_string(), DEFAULT_FAL_MODEL.to_string()).unwrap()
    }

    #[test]
    fn test_with_api_key_creates_client() {
        let client = test_client();
        assert_eq!(client.model(), "fal-ai/ltx-video");
        assert_eq!(client.queue_base_url(), FAL_QUEUE_BASE_URL);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = FalClient::with_api_key("".to_string(), DEFAULT_FAL_MODEL.to_string());
        assert!(matches!(result, Err(GenError::MissingApiKey { .. })));
    }

    #[test]
    fn test_generate_request_serialization() {
        let request = GenerateRequest {
            prompt: "a sunrise over mountains".to_string(),
            image_url: None,
            num_frames: Some(120),
            num_inference_steps: 30,
            guidance_scale: 3.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "a sunrise over mountains");
        assert_eq!(json["num_frames"], 120);
        assert_eq!(json["num_inference_steps"], 30);
        assert_eq!(json["guidance_scale"], 3.0);
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_generate_request_with_image_url_omits_frame_count() {
        let request = GenerateRequest {
            prompt: "animate this".to_string(),
            image_url: Some("https://fal.media/files/img.png".to_string()),
            num_frames: None,
            num_inference_steps: 30,
            guidance_scale: 3.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["image_url"], "https://fal.media/files/img.png");
        assert!(json.get("num_frames").is_none());
    }

    #[test]
    fn test_frame_count_rejects_overflow() {
        assert_eq!(frame_count(5, 24).unwrap(), 120);
        assert!(matches!(
            frame_count(u32::MAX, 2),
            Err(GenError::MissingField(_))
        ));
    }

    #[test]
    fn test_result_url_prefers_nested_video() {
        let result: ResultResponse = serde_json::from_str(
            r#"{"video": {"url": "https://fal.media/nested.mp4"}, "video_url": "https://fal.media/flat.mp4"}"#,
        )
        .unwrap();
        assert_eq!(
            result.into_video_url().as_deref(),
            Some("https://fal.media/nested.mp4")
        );
    }

    #[test]
    fn test_result_url_falls_back_to_flat_field() {
        let result: ResultResponse =
            serde_json::from_str(r#"{"video_url": "https://fal.media/flat.mp4"}"#).unwrap();
        assert_eq!(
            result.into_video_url().as_deref(),
            Some("https://fal.media/flat.mp4")
        );
    }

    #[test]
    fn test_result_url_missing_entirely() {
        let result: ResultResponse = serde_json::from_str(r#"{"seed": 42}"#).unwrap();
        assert!(result.into_video_url().is_none());
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_before_any_request() {
        let client = test_client();
        let result = client
            .text_to_video("", Path::new("out.mp4"), 5, 24)
            .await;
        assert!(matches!(result, Err(GenError::MissingField(_))));
    }

    #[tokio::test]
    async fn test_overflowing_frame_count_rejected_before_any_request() {
        let client = test_client();
        let result = client
            .text_to_video("a sunrise", Path::new("out.mp4"), u32::MAX, 2)
            .await;
        match result {
            Err(GenError::MissingField(msg)) => {
                assert!(msg.contains("exceeds the supported frame count"))
            }
            other => panic!("expected MissingField, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 50), "hello");
        assert_eq!(truncate("hello world", 5), "hello");
        // Multibyte input must not split a char
        assert_eq!(truncate("héllo", 2), "hé");
    }

    #[test]
    fn test_default_poll_budget_is_two_minutes() {
        assert_eq!(DEFAULT_POLL.interval, Duration::from_secs(2));
        assert_eq!(DEFAULT_POLL.max_attempts, 60);
        assert_eq!(DEFAULT_POLL.budget_minutes(), 2);
    }
}
