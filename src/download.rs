//! Streaming download of generated media artifacts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::GenError;

/// Timeout for a single artifact download request.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Download a file from a URL to disk, streaming chunks to avoid loading
/// the full video into memory.
///
/// Creates parent directories as needed. Returns the destination path.
pub async fn download_to(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<PathBuf, GenError> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let response = client.get(url).timeout(DOWNLOAD_TIMEOUT).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(GenError::Api(format!(
            "Download failed with status {}: {}",
            status, error_text
        )));
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_timeout_is_60s() {
        assert_eq!(DOWNLOAD_TIMEOUT, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_download_fails_cleanly_without_server() {
        let client = reqwest::Client::new();
        let dest = std::env::temp_dir().join("media-gen-test-download/video.mp4");
        let result = download_to(&client, "http://localhost:1/fake.mp4", &dest).await;
        assert!(matches!(result, Err(GenError::Http(_))));
        let _ = std::fs::remove_dir_all(std::env::temp_dir().join("media-gen-test-download"));
    }
}
