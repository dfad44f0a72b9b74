//! Text-to-speech wrapper binary (Google Cloud TTS).
//!
//! Reads a request from stdin JSON when piped, or from positional
//! arguments, and prints a single JSON result object on stdout.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};

use media_gen::config::Config;
use media_gen::error::GenError;
use media_gen::input::{self, TtsRequest};
use media_gen::outcome::{self, Outcome};
use media_gen::tts::{TtsClient, TtsOutput};

/// Generate speech audio with Google Cloud Text-to-Speech
#[derive(Parser, Debug)]
#[command(name = "tts-generate")]
#[command(version, about = "Generate speech audio with Google Cloud Text-to-Speech")]
#[command(after_help = "EXAMPLES:
    # Positional arguments
    tts-generate 'your text' output.mp3

    # JSON on stdin
    echo '{\"text\":\"your text\",\"output_path\":\"output.mp3\"}' | tts-generate")]
struct Args {
    /// Text to synthesize
    text: Option<String>,

    /// Output audio file path
    #[arg(default_value = "output.mp3")]
    output: String,

    /// Voice name (e.g. en-US-Neural2-J)
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Config file path
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();
    env_logger::init();

    let args = Args::parse();

    let request = match input::stdin_request::<TtsRequest>() {
        Some(Ok(request)) => request,
        Some(Err(e)) => {
            outcome::emit(&Outcome::<TtsOutput>::from_error(&e));
            return;
        }
        None => match args.text.clone() {
            Some(text) => TtsRequest {
                text,
                output_path: args.output.clone(),
                voice: args.voice.clone(),
                speed: args.speed,
            },
            None => {
                let _ = Args::command().print_help();
                return;
            }
        },
    };

    match run(request, args.config.as_deref()).await {
        Ok(output) => outcome::emit(&Outcome::success(output)),
        Err(e) => outcome::emit(&Outcome::<TtsOutput>::from_error(&e)),
    }
}

async fn run(request: TtsRequest, config_path: Option<&Path>) -> Result<TtsOutput, GenError> {
    if request.text.trim().is_empty() {
        return Err(GenError::MissingField("No text provided".to_string()));
    }

    let config = Config::load(config_path)?;
    let client = TtsClient::new()?;

    let voice = request.voice.or(config.tts.voice);
    client
        .generate_audio(
            &request.text,
            Path::new(&request.output_path),
            voice.as_deref(),
            request.speed,
        )
        .await
}
