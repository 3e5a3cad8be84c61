use serde::{Deserialize, Serialize};

/// Embedding input that accepts either a single string or a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// Single text input
    Single(String),
    /// Multiple text inputs
    Multiple(Vec<String>),
}

impl EmbeddingInput {
    /// Return the inputs as string slices
    pub fn as_vec(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Multiple(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// Speech synthesis input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechInput {
    /// Text to synthesize
    pub input: String,
    /// Voice identifier (e.g. "alloy")
    pub voice: String,
    /// Style instructions for models that accept them
    pub instructions: Option<String>,
    /// Output audio format (mp3, opus, aac, flac, wav, pcm)
    pub response_format: Option<String>,
}

/// Transcription input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptionInput {
    /// Raw audio bytes
    pub file: Vec<u8>,
    /// Language hint (ISO 639-1)
    pub language: Option<String>,
    /// Prompt to guide the transcription
    pub prompt: Option<String>,
    /// Response format (json, text, srt, `verbose_json`, vtt)
    pub response_format: Option<String>,
}

impl TranscriptionInput {
    /// Whether the requested format comes back as plain text rather than JSON
    pub fn expects_plain_text(&self) -> bool {
        matches!(self.response_format.as_deref(), Some("text" | "srt" | "vtt"))
    }
}
