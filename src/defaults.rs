//! Default generation parameters, unified in one place.
//!
//! The binaries and the config file both resolve against these values, so
//! there is a single source of truth for avatar/voice identifiers and video
//! dimensions.

/// Default HeyGen avatar for video generation.
pub const DEFAULT_AVATAR_ID: &str = "Annie_expressive10_public";

/// Default HeyGen voice for text-to-speech.
pub const DEFAULT_HEYGEN_VOICE_ID: &str = "1bd001e7e50f421d891986aad5158bc8";

/// Default background descriptor.
pub const DEFAULT_BACKGROUND: &str = "newsroom";

/// Solid color used for the "newsroom" background.
pub const NEWSROOM_BACKGROUND_COLOR: &str = "#1a2332";

/// Video dimensions - portrait mode for TikTok/Instagram Reels/YouTube Shorts.
pub const DEFAULT_VIDEO_WIDTH: u32 = 720;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 1280;

/// Default Google Cloud TTS voice (professional female news voice).
pub const DEFAULT_TTS_VOICE: &str = "en-US-Neural2-F";

/// Default speaking/voice speed multiplier.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Default fal.ai model for video generation.
pub const DEFAULT_FAL_MODEL: &str = "fal-ai/ltx-video";

/// Default clip duration in seconds (fal.ai).
pub const DEFAULT_DURATION_SECS: u32 = 5;

/// Default frames per second (fal.ai).
pub const DEFAULT_FPS: u32 = 24;

/// Resolved avatar generation defaults, after merging the config file over
/// the built-in constants. Passed into `HeygenClient` so per-request fields
/// only need to override what they care about.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarDefaults {
    pub avatar_id: String,
    pub voice_id: String,
    pub background_color: String,
    pub width: u32,
    pub height: u32,
}

impl Default for AvatarDefaults {
    fn default() -> Self {
        Self {
            avatar_id: DEFAULT_AVATAR_ID.to_string(),
            voice_id: DEFAULT_HEYGEN_VOICE_ID.to_string(),
            background_color: NEWSROOM_BACKGROUND_COLOR.to_string(),
            width: DEFAULT_VIDEO_WIDTH,
            height: DEFAULT_VIDEO_HEIGHT,
        }
    }
}
