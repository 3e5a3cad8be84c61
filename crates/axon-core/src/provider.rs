use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::context::RequestContext;
use crate::error::UnifiedError;
use crate::hooks::PostHookRunner;
use crate::types::{
    EmbeddingInput, Message, ModelParameters, SpeechInput, StreamEvent, TranscriptionInput, UnifiedResponse,
};

/// Receiving half of a provider stream
///
/// Closes after the terminal event, or without one when the request is
/// cancelled.
pub type EventStream = mpsc::Receiver<StreamEvent>;

/// Operations every provider adapter exposes
///
/// Streaming methods return once the vendor accepted the request; events
/// then arrive on the returned channel, each passed through `hooks` first.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider id stamped on every response and error
    fn key(&self) -> &str;

    /// Legacy text completion
    async fn text_completion(
        &self,
        _ctx: &RequestContext,
        _model: &str,
        _prompt: &str,
        _params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError> {
        Err(UnifiedError::unsupported("text completion", self.key()))
    }

    async fn chat_completion(
        &self,
        ctx: &RequestContext,
        model: &str,
        messages: &[Message],
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError>;

    async fn chat_completion_stream(
        &self,
        ctx: &RequestContext,
        hooks: Arc<dyn PostHookRunner>,
        model: &str,
        messages: &[Message],
        params: Option<&ModelParameters>,
    ) -> Result<EventStream, UnifiedError>;

    async fn embedding(
        &self,
        ctx: &RequestContext,
        model: &str,
        input: &EmbeddingInput,
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError>;

    async fn speech(
        &self,
        ctx: &RequestContext,
        model: &str,
        input: &SpeechInput,
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError>;

    async fn speech_stream(
        &self,
        ctx: &RequestContext,
        hooks: Arc<dyn PostHookRunner>,
        model: &str,
        input: &SpeechInput,
        params: Option<&ModelParameters>,
    ) -> Result<EventStream, UnifiedError>;

    async fn transcription(
        &self,
        ctx: &RequestContext,
        model: &str,
        input: &TranscriptionInput,
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError>;

    async fn transcription_stream(
        &self,
        ctx: &RequestContext,
        hooks: Arc<dyn PostHookRunner>,
        model: &str,
        input: &TranscriptionInput,
        params: Option<&ModelParameters>,
    ) -> Result<EventStream, UnifiedError>;
}
