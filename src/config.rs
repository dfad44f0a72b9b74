//! Configuration file handling.
//!
//! Loads optional default overrides from `~/.config/media-gen/config.toml`
//! or a custom path. Precedence everywhere is: request field > config file >
//! built-in default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::defaults::AvatarDefaults;
use crate::error::GenError;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct TtsConfig {
    /// Default Google TTS voice name.
    pub voice: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct VideoConfig {
    /// Default fal.ai model.
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AvatarConfig {
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub background_color: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Returns default config if the file doesn't exist. Returns an error if
    /// the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, GenError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            GenError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            GenError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Avatar defaults with config-file overrides applied.
    pub fn avatar_defaults(&self) -> AvatarDefaults {
        let base = AvatarDefaults::default();
        AvatarDefaults {
            avatar_id: self.avatar.avatar_id.clone().unwrap_or(base.avatar_id),
            voice_id: self.avatar.voice_id.clone().unwrap_or(base.voice_id),
            background_color: self
                .avatar
                .background_color
                .clone()
                .unwrap_or(base.background_color),
            width: self.avatar.width.unwrap_or(base.width),
            height: self.avatar.height.unwrap_or(base.height),
        }
    }
}

/// Default config file path: `~/.config/media-gen/config.toml`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("media-gen")
        .join("config.toml")
}
