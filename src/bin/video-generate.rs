//! Video generation wrapper binary (fal.ai).
//!
//! Supports text-to-video and image-to-video, with the mode given either by
//! subcommand or by the `mode` field of a stdin JSON request.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use media_gen::config::Config;
use media_gen::defaults::{DEFAULT_DURATION_SECS, DEFAULT_FAL_MODEL, DEFAULT_FPS};
use media_gen::error::GenError;
use media_gen::fal::{FalClient, VideoResult};
use media_gen::input::{self, VideoRequest};
use media_gen::outcome::{self, Outcome};

/// Generate video with fal.ai
#[derive(Parser, Debug)]
#[command(name = "video-generate")]
#[command(version, about = "Generate video from text or image prompts with fal.ai")]
#[command(after_help = "EXAMPLES:
    # Text-to-video
    video-generate text 'a sunrise over mountains' output.mp4

    # Image-to-video
    video-generate image photo.png 'gentle camera pan' output.mp4

    # JSON on stdin
    echo '{\"mode\":\"text_to_video\",\"prompt\":\"...\"}' | video-generate")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a video from a text prompt
    Text {
        /// Text description of the desired video
        prompt: String,
        /// Output video file path
        #[arg(default_value = "output.mp4")]
        output: String,
        /// fal.ai model to use
        #[arg(long)]
        model: Option<String>,
        /// Clip duration in seconds
        #[arg(long, default_value_t = 5)]
        duration: u32,
        /// Frames per second
        #[arg(long, default_value_t = 24)]
        fps: u32,
    },
    /// Generate a video animating a local image
    Image {
        /// Path to the input image
        image: String,
        /// Description of the desired motion
        #[arg(default_value = "animate this image")]
        prompt: String,
        /// Output video file path
        #[arg(default_value = "output.mp4")]
        output: String,
        /// fal.ai model to use
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();
    env_logger::init();

    let args = Args::parse();

    let request = match input::stdin_request::<VideoRequest>() {
        Some(Ok(request)) => request,
        Some(Err(e)) => {
            outcome::emit(&Outcome::<VideoResult>::from_error(&e));
            return;
        }
        None => match args.command {
            Some(Command::Text {
                prompt,
                output,
                model,
                duration,
                fps,
            }) => VideoRequest {
                mode: "text_to_video".to_string(),
                prompt,
                image_path: None,
                output_path: output,
                model,
                duration,
                fps,
            },
            Some(Command::Image {
                image,
                prompt,
                output,
                model,
            }) => VideoRequest {
                mode: "image_to_video".to_string(),
                prompt,
                image_path: Some(image),
                output_path: output,
                model,
                duration: DEFAULT_DURATION_SECS,
                fps: DEFAULT_FPS,
            },
            None => {
                let _ = Args::command().print_help();
                return;
            }
        },
    };

    match run(request, args.config.as_deref()).await {
        Ok(output) => outcome::emit(&Outcome::success(output)),
        Err(e) => outcome::emit(&Outcome::<VideoResult>::from_error(&e)),
    }
}

async fn run(request: VideoRequest, config_path: Option<&Path>) -> Result<VideoResult, GenError> {
    if request.prompt.trim().is_empty() {
        return Err(GenError::MissingField("No prompt provided".to_string()));
    }

    let config = Config::load(config_path)?;
    let model = request
        .model
        .or(config.video.model)
        .unwrap_or_else(|| DEFAULT_FAL_MODEL.to_string());
    let client = FalClient::new(model)?;

    match request.mode.as_str() {
        "text_to_video" => {
            client
                .text_to_video(
                    &request.prompt,
                    Path::new(&request.output_path),
                    request.duration,
                    request.fps,
                )
                .await
        }
        "image_to_video" => {
            let image_path = request
                .image_path
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| GenError::MissingField("No image_path provided".to_string()))?;
            client
                .image_to_video(
                    Path::new(&image_path),
                    &request.prompt,
                    Path::new(&request.output_path),
                )
                .await
        }
        other => Err(GenError::UnknownMode(other.to_string())),
    }
}
