//! `OpenAI` provider: gating, authentication and HTTP invocation

use std::sync::Arc;

use async_trait::async_trait;
use axon_config::{ProviderConfig, RequestKind};
use axon_core::types::{
    EmbeddingInput, Message, ModelParameters, SpeechInput, TranscriptionInput, UnifiedResponse,
};
use axon_core::{EventStream, PostHookRunner, Provider, RequestContext, UnifiedError};
use bytes::Bytes;
use futures_util::TryStreamExt;
use http::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::error;
use crate::format::{self, MultipartPayload};
use crate::http_client::{self, HttpClients};
use crate::normalize::{self, Stamp};
use crate::stream::{self, AudioKind, AudioRelay, ChatAccumulator, ChunkHandler, Sink};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const EMBEDDINGS_PATH: &str = "/v1/embeddings";
const SPEECH_PATH: &str = "/v1/audio/speech";
const TRANSCRIPTIONS_PATH: &str = "/v1/audio/transcriptions";

enum Body {
    Json(Vec<u8>),
    Multipart(MultipartPayload),
}

/// Adapter for the `OpenAI` REST API and compatible backends
pub struct OpenAiProvider {
    key: String,
    config: ProviderConfig,
    clients: HttpClients,
    extra_headers: HeaderMap,
}

impl OpenAiProvider {
    /// Create a provider named `key` from its configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout, the stream buffer size or an extra header
    /// is invalid, or the HTTP clients cannot be built
    pub fn new(key: impl Into<String>, config: ProviderConfig) -> anyhow::Result<Self> {
        let key = key.into();
        anyhow::ensure!(
            config.network.stream_buffer_size > 0,
            "provider '{key}': stream_buffer_size must be greater than 0"
        );
        let clients = http_client::build(&config.network)?;

        let mut extra_headers = HeaderMap::new();
        for (name, value) in &config.extra_headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow::anyhow!("provider '{key}': invalid header name '{name}': {e}"))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| anyhow::anyhow!("provider '{key}': invalid value for header '{name}': {e}"))?;
            extra_headers.insert(header, value);
        }

        tracing::debug!(provider = %key, base_url = %config.base_url, "provider initialized");

        Ok(Self {
            key,
            config,
            clients,
            extra_headers,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url_trimmed())
    }

    fn ensure_allowed(&self, kind: RequestKind) -> Result<(), UnifiedError> {
        if self.config.allowed_requests.allows(kind) {
            Ok(())
        } else {
            tracing::debug!(provider = %self.key, operation = kind.as_str(), "operation disabled");
            Err(UnifiedError::unsupported(kind.as_str(), &self.key))
        }
    }

    /// Request context key first, then the configured one
    fn api_key<'a>(&'a self, ctx: &'a RequestContext) -> Option<&'a SecretString> {
        ctx.api_key
            .as_ref()
            .or(self.config.api_key.as_ref())
            .filter(|key| !key.expose_secret().is_empty())
    }

    /// Extra headers first; the standard headers then overwrite them
    fn headers(&self, ctx: &RequestContext, json: bool, stream: bool) -> Result<HeaderMap, UnifiedError> {
        let mut headers = self.extra_headers.clone();

        if json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        } else {
            // multipart sets its own boundary
            headers.remove(CONTENT_TYPE);
        }

        if let Some(key) = self.api_key(ctx) {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {}", key.expose_secret())).map_err(UnifiedError::marshal)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        if stream {
            headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }

        Ok(headers)
    }

    fn json_body(&self, payload: &Value) -> Result<Body, UnifiedError> {
        serde_json::to_vec(payload)
            .map(Body::Json)
            .map_err(|e| self.tagged(UnifiedError::marshal(e)))
    }

    fn request(
        &self,
        client: &Client,
        ctx: &RequestContext,
        path: &str,
        body: Body,
        stream: bool,
    ) -> Result<RequestBuilder, UnifiedError> {
        if ctx.is_cancelled() {
            return Err(UnifiedError::cancelled());
        }

        let headers = self.headers(ctx, matches!(body, Body::Json(_)), stream)?;
        let builder = client.post(self.url(path)).headers(headers);

        Ok(match body {
            Body::Json(bytes) => builder.body(bytes),
            Body::Multipart(payload) => builder.multipart(payload.into_form().map_err(UnifiedError::marshal)?),
        })
    }

    /// Send a buffered request, racing it against cancellation
    async fn execute(&self, ctx: &RequestContext, path: &str, body: Body) -> Result<Bytes, UnifiedError> {
        let request = self
            .request(&self.clients.buffered, ctx, path, body, false)
            .map_err(|e| self.tagged(e))?;

        let exchange = async {
            let response = request.send().await.map_err(UnifiedError::request)?;
            let status = response.status();
            let body = response.bytes().await.map_err(UnifiedError::request)?;

            if status.is_success() {
                Ok(body)
            } else {
                Err(error::from_response(status.as_u16(), &body))
            }
        };

        let result = tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => Err(UnifiedError::cancelled()),
            result = exchange => result,
        };

        result.map_err(|e| {
            tracing::warn!(provider = %self.key, path, error = %e, "request failed");
            self.tagged(e)
        })
    }

    /// Open a streaming request; a non-success status is returned as an error
    async fn open_stream(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Body,
    ) -> Result<reqwest::Response, UnifiedError> {
        let request = self
            .request(&self.clients.streaming, ctx, path, body, true)
            .map_err(|e| self.tagged(e))?;

        let exchange = async {
            let response = request.send().await.map_err(UnifiedError::request)?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body = response.bytes().await.map_err(UnifiedError::request)?;
            Err(error::from_response(status.as_u16(), &body))
        };

        let result = tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => Err(UnifiedError::cancelled()),
            result = exchange => result,
        };

        result.map_err(|e| {
            tracing::warn!(provider = %self.key, path, error = %e, "stream request failed");
            self.tagged(e)
        })
    }

    /// Hand the response body to a dedicated worker task
    fn spawn_worker<H>(
        &self,
        ctx: &RequestContext,
        hooks: Arc<dyn PostHookRunner>,
        response: reqwest::Response,
        handler: H,
    ) -> EventStream
    where
        H: ChunkHandler + 'static,
    {
        let (tx, rx) = mpsc::channel(self.config.network.stream_buffer_size);
        let reader = StreamReader::new(Box::pin(response.bytes_stream().map_err(std::io::Error::other)));

        let sink = Sink {
            ctx: ctx.clone(),
            hooks,
            tx,
            provider: self.key.clone(),
        };

        tokio::spawn(stream::drive(reader, handler, sink));
        rx
    }

    fn stamp<'a>(&'a self, params: Option<&'a ModelParameters>) -> Stamp<'a> {
        Stamp {
            provider: self.key.as_str(),
            params,
            send_back_raw_response: self.config.send_back_raw_response,
        }
    }

    fn tagged(&self, error: UnifiedError) -> UnifiedError {
        if error.provider.is_some() {
            error
        } else {
            error.with_provider(self.key.clone())
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn key(&self) -> &str {
        &self.key
    }

    async fn chat_completion(
        &self,
        ctx: &RequestContext,
        model: &str,
        messages: &[Message],
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError> {
        self.ensure_allowed(RequestKind::ChatCompletion)?;
        tracing::debug!(provider = %self.key, model, messages = messages.len(), "chat completion");

        let payload =
            format::chat_payload(model, messages, params, false).map_err(|e| self.tagged(UnifiedError::marshal(e)))?;
        let body = self.execute(ctx, CHAT_COMPLETIONS_PATH, self.json_body(&payload)?).await?;

        normalize::chat(&body, &self.stamp(params)).map_err(|e| self.tagged(e))
    }

    async fn chat_completion_stream(
        &self,
        ctx: &RequestContext,
        hooks: Arc<dyn PostHookRunner>,
        model: &str,
        messages: &[Message],
        params: Option<&ModelParameters>,
    ) -> Result<EventStream, UnifiedError> {
        self.ensure_allowed(RequestKind::ChatCompletionStream)?;
        tracing::debug!(provider = %self.key, model, messages = messages.len(), "chat completion stream");

        let payload =
            format::chat_payload(model, messages, params, true).map_err(|e| self.tagged(UnifiedError::marshal(e)))?;
        let response = self
            .open_stream(ctx, CHAT_COMPLETIONS_PATH, self.json_body(&payload)?)
            .await?;

        let handler = ChatAccumulator::new(self.key.clone(), model, params.cloned());
        Ok(self.spawn_worker(ctx, hooks, response, handler))
    }

    async fn text_completion(
        &self,
        _ctx: &RequestContext,
        model: &str,
        _prompt: &str,
        _params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError> {
        self.ensure_allowed(RequestKind::TextCompletion)?;
        tracing::debug!(provider = %self.key, model, "text completion has no openai endpoint");
        Err(UnifiedError::unsupported(RequestKind::TextCompletion.as_str(), &self.key))
    }

    async fn embedding(
        &self,
        ctx: &RequestContext,
        model: &str,
        input: &EmbeddingInput,
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError> {
        self.ensure_allowed(RequestKind::Embedding)?;
        tracing::debug!(provider = %self.key, model, inputs = input.as_vec().len(), "embedding");

        let payload =
            format::embedding_payload(model, input, params).map_err(|e| self.tagged(UnifiedError::marshal(e)))?;
        let body = self.execute(ctx, EMBEDDINGS_PATH, self.json_body(&payload)?).await?;

        normalize::embedding(&body, &self.stamp(params)).map_err(|e| self.tagged(e))
    }

    async fn speech(
        &self,
        ctx: &RequestContext,
        model: &str,
        input: &SpeechInput,
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError> {
        self.ensure_allowed(RequestKind::Speech)?;
        tracing::debug!(provider = %self.key, model, voice = %input.voice, "speech");

        let payload = format::speech_payload(model, input, params, false);
        let body = self.execute(ctx, SPEECH_PATH, self.json_body(&payload)?).await?;

        Ok(normalize::speech(&body, model, &self.stamp(params)))
    }

    async fn speech_stream(
        &self,
        ctx: &RequestContext,
        hooks: Arc<dyn PostHookRunner>,
        model: &str,
        input: &SpeechInput,
        params: Option<&ModelParameters>,
    ) -> Result<EventStream, UnifiedError> {
        self.ensure_allowed(RequestKind::SpeechStream)?;
        tracing::debug!(provider = %self.key, model, voice = %input.voice, "speech stream");

        let payload = format::speech_payload(model, input, params, true);
        let response = self.open_stream(ctx, SPEECH_PATH, self.json_body(&payload)?).await?;

        let handler = AudioRelay::new(AudioKind::Speech, self.key.clone(), model, params.cloned());
        Ok(self.spawn_worker(ctx, hooks, response, handler))
    }

    async fn transcription(
        &self,
        ctx: &RequestContext,
        model: &str,
        input: &TranscriptionInput,
        params: Option<&ModelParameters>,
    ) -> Result<UnifiedResponse, UnifiedError> {
        self.ensure_allowed(RequestKind::Transcription)?;
        tracing::debug!(provider = %self.key, model, bytes = input.file.len(), "transcription");

        let payload = format::transcription_payload(model, input, params, false);
        let body = self.execute(ctx, TRANSCRIPTIONS_PATH, Body::Multipart(payload)).await?;

        normalize::transcription(&body, model, input, &self.stamp(params)).map_err(|e| self.tagged(e))
    }

    async fn transcription_stream(
        &self,
        ctx: &RequestContext,
        hooks: Arc<dyn PostHookRunner>,
        model: &str,
        input: &TranscriptionInput,
        params: Option<&ModelParameters>,
    ) -> Result<EventStream, UnifiedError> {
        self.ensure_allowed(RequestKind::TranscriptionStream)?;
        tracing::debug!(provider = %self.key, model, bytes = input.file.len(), "transcription stream");

        let payload = format::transcription_payload(model, input, params, true);
        let response = self
            .open_stream(ctx, TRANSCRIPTIONS_PATH, Body::Multipart(payload))
            .await?;

        let handler = AudioRelay::new(AudioKind::Transcription, self.key.clone(), model, params.cloned());
        Ok(self.spawn_worker(ctx, hooks, response, handler))
    }
}
