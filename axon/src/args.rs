use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Axon OpenAI adapter
#[derive(Debug, Parser)]
#[command(name = "axon", about = "Run chat, embedding, speech and transcription requests against an OpenAI-compatible provider")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "axon.toml", env = "AXON_CONFIG")]
    pub config: PathBuf,

    /// Provider key from the configuration; the first one when omitted
    #[arg(short, long, env = "AXON_PROVIDER")]
    pub provider: Option<String>,

    /// API key for this request, overriding the configured one
    #[arg(long, env = "AXON_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat completion
    Chat(ChatArgs),
    /// Embed one or more inputs
    Embed(EmbedArgs),
    /// Synthesize speech
    Speech(SpeechArgs),
    /// Transcribe an audio file
    Transcribe(TranscribeArgs),
}

#[derive(Debug, ClapArgs)]
pub struct ChatArgs {
    #[arg(short, long)]
    pub model: String,

    /// User prompt
    pub prompt: String,

    /// Optional system prompt
    #[arg(short, long)]
    pub system: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub temperature: Option<f64>,

    /// Print events as they arrive
    #[arg(long)]
    pub stream: bool,
}

#[derive(Debug, ClapArgs)]
pub struct EmbedArgs {
    #[arg(short, long)]
    pub model: String,

    /// Texts to embed
    #[arg(required = true)]
    pub input: Vec<String>,

    #[arg(long)]
    pub dimensions: Option<u32>,

    /// "float" or "base64"
    #[arg(long)]
    pub encoding_format: Option<String>,
}

#[derive(Debug, ClapArgs)]
pub struct SpeechArgs {
    #[arg(short, long)]
    pub model: String,

    /// Text to speak
    pub input: String,

    #[arg(long, default_value = "alloy")]
    pub voice: String,

    #[arg(long)]
    pub instructions: Option<String>,

    /// Audio format, mp3 when omitted
    #[arg(long)]
    pub format: Option<String>,

    /// Where to write the audio
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long)]
    pub stream: bool,
}

#[derive(Debug, ClapArgs)]
pub struct TranscribeArgs {
    #[arg(short, long)]
    pub model: String,

    /// Audio file to transcribe
    pub file: PathBuf,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub prompt: Option<String>,

    /// json, verbose_json, text, srt or vtt
    #[arg(long)]
    pub response_format: Option<String>,

    #[arg(long)]
    pub stream: bool,
}
