//! Avatar video wrapper binary (HeyGen).
//!
//! Generates a talking-head avatar video from inline text (HeyGen built-in
//! TTS, preferred) or from a pre-recorded audio file (legacy). When both are
//! supplied, text wins. Supplying a callback URL returns a `processing`
//! result immediately instead of polling.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};

use media_gen::config::Config;
use media_gen::error::GenError;
use media_gen::heygen::{AvatarGeneration, AvatarOptions, AvatarResult, HeygenClient};
use media_gen::input::{self, non_empty, AvatarRequest};
use media_gen::outcome::{self, Outcome};

/// Generate avatar videos with HeyGen
#[derive(Parser, Debug)]
#[command(name = "avatar-generate")]
#[command(version, about = "Generate talking-head avatar videos with HeyGen")]
#[command(after_help = "EXAMPLES:
    # From text (HeyGen built-in TTS)
    avatar-generate 'Good evening, here is the news.' output.mp4

    # From a pre-recorded audio file
    avatar-generate --audio narration.mp3 output.mp4

    # JSON on stdin
    echo '{\"text\":\"...\",\"output_path\":\"output.mp4\"}' | avatar-generate")]
struct Args {
    /// Text for the avatar to speak
    text: Option<String>,

    /// Output video file path
    #[arg(default_value = "output.mp4")]
    output: String,

    /// Pre-recorded audio file (ignored when text is given)
    #[arg(long)]
    audio: Option<String>,

    /// Avatar identifier
    #[arg(long)]
    avatar_id: Option<String>,

    /// Voice identifier (text mode)
    #[arg(long)]
    voice_id: Option<String>,

    /// Voice speed multiplier (text mode)
    #[arg(long)]
    speed: Option<f64>,

    /// Background descriptor: "newsroom" or a color value
    #[arg(long)]
    background: Option<String>,

    /// Background image: local file path or http(s) URL
    #[arg(long)]
    background_image: Option<String>,

    /// Webhook URL; when set, returns immediately without polling
    #[arg(long)]
    callback_url: Option<String>,

    /// Config file path
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();
    env_logger::init();

    let args = Args::parse();

    let request = match input::stdin_request::<AvatarRequest>() {
        Some(Ok(request)) => request,
        Some(Err(e)) => {
            outcome::emit(&Outcome::<AvatarResult>::from_error(&e));
            return;
        }
        None => {
            if args.text.is_none() && args.audio.is_none() {
                let _ = Args::command().print_help();
                return;
            }
            AvatarRequest {
                text: args.text.clone(),
                audio_path: args.audio.clone(),
                output_path: args.output.clone(),
                avatar_id: args.avatar_id.clone(),
                voice_id: args.voice_id.clone(),
                speed: args.speed,
                background: args.background.clone(),
                background_image: args.background_image.clone(),
                callback_url: args.callback_url.clone(),
            }
        }
    };

    match run(request, args.config.as_deref()).await {
        Ok(AvatarGeneration::Completed(result)) => outcome::emit(&Outcome::success(result)),
        Ok(AvatarGeneration::Processing {
            video_id,
            callback_url,
        }) => outcome::emit(&Outcome::<AvatarResult>::Processing {
            video_id,
            callback_url,
        }),
        Err(e) => outcome::emit(&Outcome::<AvatarResult>::from_error(&e)),
    }
}

async fn run(
    request: AvatarRequest,
    config_path: Option<&Path>,
) -> Result<AvatarGeneration, GenError> {
    let text = non_empty(request.text.as_deref());
    let audio_path = non_empty(request.audio_path.as_deref());
    if text.is_none() && audio_path.is_none() {
        // Checked before any credential lookup or network call
        return Err(GenError::MissingField(
            "No text or audio_path provided".to_string(),
        ));
    }

    let config = Config::load(config_path)?;
    let client = HeygenClient::new(config.avatar_defaults())?;

    let options = AvatarOptions {
        avatar_id: request.avatar_id,
        voice_id: request.voice_id,
        speed: request.speed,
        background: request.background,
        background_image: request.background_image,
        callback_url: request.callback_url,
    };

    let output_path = Path::new(&request.output_path);

    // Text takes priority over audio_path when both are present.
    match (text, audio_path) {
        (Some(text), _) => client.generate_from_text(text, output_path, &options).await,
        (None, Some(audio)) => {
            client
                .generate_from_audio(Path::new(audio), output_path, &options)
                .await
        }
        (None, None) => Err(GenError::MissingField(
            "No text or audio_path provided".to_string(),
        )),
    }
}
