//! Content-type detection for uploaded assets.
//!
//! Image detection prefers magic bytes over the file extension, so a PNG
//! saved with a `.jpg` name is still uploaded as `image/png`.

use std::path::Path;

/// PNG file signature.
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Content type for an image file, from magic bytes first, then extension,
/// defaulting to JPEG.
pub fn image_content_type(path: &Path, bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&PNG_MAGIC) {
        return "image/png";
    }
    match extension(path).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/jpeg",
    }
}

/// Content type for an audio file, from the extension, defaulting to MP3.
pub fn audio_content_type(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("mp3") => "audio/mpeg",
        _ => "audio/mpeg",
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
