//! Crate-wide error type for the media generation wrappers.
//!
//! Every failure category collapses into a single enum so the binaries can
//! convert any error into the uniform `{"status":"error",...}` JSON result.

/// Errors that can occur during media generation operations.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("{var} environment variable not set")]
    MissingApiKey {
        /// Name of the missing environment variable
        var: &'static str,
    },

    #[error("{0}")]
    MissingField(String),

    #[error("Invalid JSON input: {0}")]
    InvalidInput(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("No video URL in response")]
    MissingResultUrl {
        /// Raw response body, kept for diagnosis
        details: String,
    },

    #[error("Video generation failed: {0}")]
    JobFailed(String),

    #[error("Video did not complete within {minutes} minutes (video_id: {video_id})")]
    Timeout {
        /// Elapsed time derived from the actual poll interval and attempt count
        minutes: u64,
        /// Vendor-issued job identifier, so the caller can resume out-of-band
        video_id: String,
        /// URL where the job can be checked manually
        check_url: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Optional diagnostic payload for the `details` field of an error result.
    pub fn details(&self) -> Option<String> {
        match self {
            GenError::MissingResultUrl { details } => Some(details.clone()),
            GenError::Timeout { check_url, .. } => {
                Some(format!("Check status manually at {}", check_url))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_display() {
        let err = GenError::MissingApiKey {
            var: "HEYGEN_API_KEY",
        };
        assert_eq!(err.to_string(), "HEYGEN_API_KEY environment variable not set");
    }

    #[test]
    fn test_missing_field_display_is_bare_message() {
        let err = GenError::MissingField("No text provided".to_string());
        assert_eq!(err.to_string(), "No text provided");
    }

    #[test]
    fn test_timeout_display_uses_actual_minutes() {
        let err = GenError::Timeout {
            minutes: 20,
            video_id: "vid-1".to_string(),
            check_url: "https://app.heygen.com/videos/vid-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Video did not complete within 20 minutes (video_id: vid-1)"
        );
        assert_eq!(
            err.details(),
            Some("Check status manually at https://app.heygen.com/videos/vid-1".to_string())
        );
    }

    #[test]
    fn test_missing_result_url_carries_details() {
        let err = GenError::MissingResultUrl {
            details: r#"{"unexpected":"shape"}"#.to_string(),
        };
        assert_eq!(err.to_string(), "No video URL in response");
        assert_eq!(err.details(), Some(r#"{"unexpected":"shape"}"#.to_string()));
    }

    #[test]
    fn test_most_errors_have_no_details() {
        assert!(GenError::Api("boom".to_string()).details().is_none());
        assert!(GenError::MissingField("x".to_string()).details().is_none());
    }
}
