//! Provider-agnostic request and response model
//!
//! Adapters translate these types to and from their vendor's wire format,
//! so callers never handle vendor payload shapes directly.

pub mod audio;
pub mod input;
pub mod message;
pub mod params;
pub mod response;
pub mod stream;
pub mod tool;

pub use audio::{
    AudioUsage, Speech, Transcription, TranscriptionLogProb, TranscriptionSegment, TranscriptionUsage,
    TranscriptionWord,
};
pub use input::{EmbeddingInput, SpeechInput, TranscriptionInput};
pub use message::{ContentBlock, FunctionCall, ImageUrl, Message, MessageContent, Role, ToolCall};
pub use params::ModelParameters;
pub use response::{
    CHAT_CHUNK_OBJECT, Choice, ChoiceDelta, ChoiceMessage, Embedding, EmbeddingData, ExtraFields, SPEECH_CHUNK_OBJECT,
    SPEECH_OBJECT, TRANSCRIPTION_CHUNK_OBJECT, TRANSCRIPTION_OBJECT, UnifiedResponse, Usage,
};
pub use stream::{StreamEvent, StreamPayload};
pub use tool::{FunctionDefinition, Tool, ToolChoice, ToolChoiceFunction, ToolChoiceFunctionName, ToolChoiceMode};
