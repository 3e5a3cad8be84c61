use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Configuration for a single provider
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key, used when the request context carries none
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Vendor base URL; trailing slashes are ignored
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Echo the vendor body on every response as `extra_fields.raw_response`
    #[serde(default)]
    pub send_back_raw_response: bool,
    /// Headers added to every request before the standard ones
    #[serde(default)]
    pub extra_headers: IndexMap<String, String>,
    /// Timeouts and stream buffering
    #[serde(default)]
    pub network: NetworkConfig,
    /// Per-operation allow list
    #[serde(default)]
    pub allowed_requests: AllowedRequests,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            send_back_raw_response: false,
            extra_headers: IndexMap::new(),
            network: NetworkConfig::default(),
            allowed_requests: AllowedRequests::default(),
        }
    }
}

impl ProviderConfig {
    /// Base URL without trailing slashes, ready for path concatenation
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL must be valid")
}

/// Network settings for a provider
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Timeout for buffered requests (e.g. "30s")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// Maximum idle time between reads on a stream; unset means no limit
    #[serde(default)]
    pub stream_read_timeout: Option<String>,
    /// Capacity of the per-stream event channel
    #[serde(default = "default_stream_buffer_size")]
    pub stream_buffer_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            stream_read_timeout: None,
            stream_buffer_size: default_stream_buffer_size(),
        }
    }
}

impl NetworkConfig {
    /// Parsed `request_timeout`
    pub fn request_timeout_duration(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.request_timeout)
    }

    /// Parsed `stream_read_timeout`, if set
    pub fn stream_read_timeout_duration(&self) -> anyhow::Result<Option<Duration>> {
        self.stream_read_timeout.as_deref().map(parse_duration).transpose()
    }
}

fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid duration '{s}': {e}"))
}

fn default_request_timeout() -> String {
    "30s".to_string()
}

const fn default_stream_buffer_size() -> usize {
    5000
}

/// Operations a provider may be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    TextCompletion,
    ChatCompletion,
    ChatCompletionStream,
    Embedding,
    Speech,
    SpeechStream,
    Transcription,
    TranscriptionStream,
}

impl RequestKind {
    /// Human-readable operation name used in error messages
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextCompletion => "text completion",
            Self::ChatCompletion => "chat completion",
            Self::ChatCompletionStream => "chat completion stream",
            Self::Embedding => "embedding",
            Self::Speech => "speech",
            Self::SpeechStream => "speech stream",
            Self::Transcription => "transcription",
            Self::TranscriptionStream => "transcription stream",
        }
    }
}

/// Per-operation allow list; every operation is allowed unless disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct AllowedRequests {
    pub text_completion: bool,
    pub chat_completion: bool,
    pub chat_completion_stream: bool,
    pub embedding: bool,
    pub speech: bool,
    pub speech_stream: bool,
    pub transcription: bool,
    pub transcription_stream: bool,
}

impl Default for AllowedRequests {
    fn default() -> Self {
        Self {
            text_completion: true,
            chat_completion: true,
            chat_completion_stream: true,
            embedding: true,
            speech: true,
            speech_stream: true,
            transcription: true,
            transcription_stream: true,
        }
    }
}

impl AllowedRequests {
    pub const fn allows(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::TextCompletion => self.text_completion,
            RequestKind::ChatCompletion => self.chat_completion,
            RequestKind::ChatCompletionStream => self.chat_completion_stream,
            RequestKind::Embedding => self.embedding,
            RequestKind::Speech => self.speech,
            RequestKind::SpeechStream => self.speech_stream,
            RequestKind::Transcription => self.transcription,
            RequestKind::TranscriptionStream => self.transcription_stream,
        }
    }
}
