use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::audio::{Speech, Transcription};
use super::message::{Role, ToolCall};
use super::params::ModelParameters;

/// Object tag of a synthetic or vendor chat stream chunk
pub const CHAT_CHUNK_OBJECT: &str = "chat.completion.chunk";
/// Object tag of a complete speech response
pub const SPEECH_OBJECT: &str = "audio.speech";
/// Object tag of a streamed speech chunk
pub const SPEECH_CHUNK_OBJECT: &str = "audio.speech.chunk";
/// Object tag of a complete transcription response
pub const TRANSCRIPTION_OBJECT: &str = "audio.transcription";
/// Object tag of a streamed transcription chunk
pub const TRANSCRIPTION_CHUNK_OBJECT: &str = "audio.transcription.chunk";

/// Provider-independent response covering every operation
///
/// Chat fills `choices`, embeddings fill `data`, speech fills `speech` and
/// transcription fills `transcribe`. Streamed chunks use the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifiedResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub object: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<EmbeddingData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<Speech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcribe: Option<Transcription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    /// Adapter metadata, never sent by the vendor
    pub extra_fields: ExtraFields,
}

/// Metadata the adapter attaches to every response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraFields {
    /// Provider key that produced the response
    pub provider: String,
    /// Parameters the request was made with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<ModelParameters>,
    /// Untouched vendor body, when the provider is configured to echo it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
    /// Position of a streamed chunk, starting at zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
}

/// One completion choice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub index: u32,
    /// Full message, on non-streaming responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ChoiceMessage>,
    /// Incremental delta, on streamed chunks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChoiceDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<Value>,
}

/// Assistant message inside a non-streaming choice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning text, whatever name the vendor used for it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Incremental content inside a streamed choice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChoiceDelta {
    /// Whether the delta carries anything a consumer should see
    ///
    /// Present-but-empty content counts; a role-only delta does not.
    pub fn has_payload(&self) -> bool {
        self.content.is_some()
            || self.thought.is_some()
            || self.refusal.is_some()
            || self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// Token usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub const fn new(prompt_tokens: u32, completion_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Fold a later usage report into this one
    ///
    /// Each counter keeps the largest value seen. The total never drops
    /// below prompt plus completion.
    pub fn absorb(&mut self, other: &Self) {
        self.prompt_tokens = self.prompt_tokens.max(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.max(other.completion_tokens);
        self.total_tokens = self.total_tokens.max(other.total_tokens);
        let sum = self.prompt_tokens.saturating_add(self.completion_tokens);
        if sum > self.total_tokens {
            self.total_tokens = sum;
        }
    }
}

/// A single embedding vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingData {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub object: String,
    pub index: u32,
    pub embedding: Embedding,
}

/// Embedding values as floats, or base64 when `encoding_format` asked for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Embedding {
    Float(Vec<f32>),
    Base64(String),
}

impl Default for Embedding {
    fn default() -> Self {
        Self::Float(Vec::new())
    }
}
