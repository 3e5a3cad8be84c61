//! Mock `OpenAI` backend for integration tests
//!
//! Serves canned chat, embedding and audio responses and records every
//! request it receives

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Audio returned by the buffered speech endpoint
pub const SPEECH_AUDIO: &[u8] = b"ID3\x04mock-audio-frames";

/// Transcript returned by the transcription endpoint
pub const TRANSCRIPT: &str = "Hello from mock";

/// How the mock answers, beyond its normal canned responses
#[derive(Debug, Clone, Default)]
pub enum Behavior {
    #[default]
    Normal,
    /// Every request fails with this status and body
    Fail { status: u16, body: String },
    /// Streaming requests get this raw SSE body
    Script(String),
    /// Streaming requests get one chunk, then the connection hangs
    Stall,
}

/// One request as the mock received it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: &'static str,
    pub headers: HeaderMap,
    pub json: Option<Value>,
    pub fields: Vec<FormField>,
}

/// One multipart form part
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> &Value {
        self.json.as_ref().expect("request had no JSON body")
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn text_field(&self, name: &str) -> Option<String> {
        self.field(name).map(|f| String::from_utf8_lossy(&f.data).into_owned())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Mock backend bound to an ephemeral port
pub struct MockOpenAi {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    behavior: Behavior,
    requests: Mutex<Vec<Recorded>>,
}

impl MockOpenAi {
    /// Start the mock server with canned responses
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Behavior::Normal).await
    }

    /// Start a mock server that fails every request
    pub async fn start_failing(status: u16, body: &str) -> anyhow::Result<Self> {
        Self::start_with(Behavior::Fail {
            status,
            body: body.to_owned(),
        })
        .await
    }

    /// Start a mock server that streams `body` verbatim
    pub async fn start_with_script(body: &str) -> anyhow::Result<Self> {
        Self::start_with(Behavior::Script(body.to_owned())).await
    }

    /// Start a mock server whose streams never finish
    pub async fn start_stalling() -> anyhow::Result<Self> {
        Self::start_with(Behavior::Stall).await
    }

    async fn start_with(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/embeddings", routing::post(handle_embeddings))
            .route("/v1/audio/speech", routing::post(handle_speech))
            .route("/v1/audio/transcriptions", routing::post(handle_transcriptions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Most recent request
    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

impl Drop for MockOpenAi {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl MockState {
    fn record(&self, path: &'static str, headers: HeaderMap, json: Option<Value>, fields: Vec<FormField>) {
        self.requests.lock().unwrap().push(Recorded {
            path,
            headers,
            json,
            fields,
        });
    }

    /// Response dictated by the configured behavior, if any
    fn forced_response(&self, streaming: bool) -> Option<Response> {
        match &self.behavior {
            Behavior::Normal => None,
            Behavior::Fail { status, body } => Some(
                (
                    StatusCode::from_u16(*status).unwrap(),
                    [(header::CONTENT_TYPE, "application/json")],
                    body.clone(),
                )
                    .into_response(),
            ),
            Behavior::Script(body) if streaming => Some(sse(body.clone())),
            Behavior::Stall if streaming => Some(stalled_sse()),
            Behavior::Script(_) | Behavior::Stall => None,
        }
    }
}

fn sse(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
        .into_response()
}

fn stalled_sse() -> Response {
    let first = "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"partial\"}}]}\n\n";
    let body = stream::once(async move { Ok::<_, Infallible>(Bytes::from_static(first.as_bytes())) })
        .chain(stream::pending::<Result<Bytes, Infallible>>());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(body),
    )
        .into_response()
}

fn data_line(chunk: &Value) -> String {
    format!("data: {chunk}\n\n")
}

// -- Chat --

async fn handle_chat_completions(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request: Value = serde_json::from_slice(&body).unwrap_or_default();
    let streaming = request["stream"] == json!(true);
    state.record("/v1/chat/completions", headers, Some(request.clone()), Vec::new());

    if let Some(response) = state.forced_response(streaming) {
        return response;
    }

    let model = request["model"].as_str().unwrap_or_default();

    if streaming {
        return sse(chat_stream_body(model));
    }

    let message = if request.get("tools").is_some() {
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_test_123",
                "type": "function",
                "function": {"name": "get_weather", "arguments": "{\"location\":\"San Francisco\"}"}
            }]
        })
    } else {
        json!({
            "role": "assistant",
            "content": "Hello from mock",
            "reasoning_content": "thinking it over"
        })
    };
    let finish_reason = if message.get("tool_calls").is_some() {
        "tool_calls"
    } else {
        "stop"
    };

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "system_fingerprint": "fp_mock",
        "choices": [{"index": 0, "message": message, "finish_reason": finish_reason}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
    .into_response()
}

/// Role chunk, reasoning, two content chunks, finish, usage, keep-alive, done
fn chat_stream_body(model: &str) -> String {
    let chunk = |choices: Value| {
        json!({
            "id": "chatcmpl-mock-stream",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000,
            "model": model,
            "choices": choices
        })
    };

    let mut body = String::new();
    body.push_str(&data_line(&chunk(json!([{"index": 0, "delta": {"role": "assistant"}}]))));
    body.push_str(&data_line(&chunk(
        json!([{"index": 0, "delta": {"reasoning_content": "hmm"}}]),
    )));
    body.push_str(&data_line(&chunk(json!([{"index": 0, "delta": {"content": "Hello"}}]))));
    body.push_str(&data_line(&chunk(json!([{"index": 0, "delta": {"content": " world"}}]))));
    body.push_str(&data_line(&chunk(
        json!([{"index": 0, "delta": {}, "finish_reason": "stop"}]),
    )));

    let mut usage = chunk(json!([]));
    usage["usage"] = json!({"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15});
    body.push_str(&data_line(&usage));

    body.push_str(": keep-alive\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

// -- Embeddings --

async fn handle_embeddings(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request: Value = serde_json::from_slice(&body).unwrap_or_default();
    state.record("/v1/embeddings", headers, Some(request.clone()), Vec::new());

    if let Some(response) = state.forced_response(false) {
        return response;
    }

    let inputs = match &request["input"] {
        Value::Array(items) => items.len(),
        _ => 1,
    };
    let base64 = request["encoding_format"] == json!("base64");

    let data: Vec<Value> = (0..inputs)
        .map(|index| {
            let vector = [0.1_f32, 0.2, 0.3];
            let embedding = if base64 {
                let bytes: Vec<u8> = vector.iter().flat_map(|v| v.to_le_bytes()).collect();
                json!(STANDARD.encode(bytes))
            } else {
                json!(vector)
            };
            json!({"object": "embedding", "index": index, "embedding": embedding})
        })
        .collect();

    Json(json!({
        "object": "list",
        "data": data,
        "model": request["model"],
        "usage": {"prompt_tokens": 8, "total_tokens": 8}
    }))
    .into_response()
}

// -- Speech --

async fn handle_speech(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request: Value = serde_json::from_slice(&body).unwrap_or_default();
    let streaming = request["stream_format"] == json!("sse");
    state.record("/v1/audio/speech", headers, Some(request), Vec::new());

    if let Some(response) = state.forced_response(streaming) {
        return response;
    }

    if streaming {
        let (head, tail) = SPEECH_AUDIO.split_at(4);
        let mut body = String::new();
        body.push_str(&data_line(
            &json!({"type": "speech.audio.delta", "audio": STANDARD.encode(head)}),
        ));
        body.push_str(&data_line(
            &json!({"type": "speech.audio.delta", "audio": STANDARD.encode(tail)}),
        ));
        body.push_str(&data_line(&json!({
            "type": "speech.audio.done",
            "usage": {"input_tokens": 14, "output_tokens": 101, "total_tokens": 115}
        })));
        return sse(body);
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        Bytes::from_static(SPEECH_AUDIO),
    )
        .into_response()
}

// -- Transcriptions --

async fn handle_transcriptions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(ToOwned::to_owned);
        let content_type = field.content_type().map(ToOwned::to_owned);
        let data = field.bytes().await.unwrap();
        fields.push(FormField {
            name,
            file_name,
            content_type,
            data,
        });
    }

    let text = |name: &str| {
        fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| String::from_utf8_lossy(&f.data).into_owned())
    };
    let streaming = text("stream").as_deref() == Some("true");
    let format = text("response_format");

    state.record("/v1/audio/transcriptions", headers, None, fields);

    if let Some(response) = state.forced_response(streaming) {
        return response;
    }

    if streaming {
        let mut body = String::new();
        for delta in ["Hello", " from", " mock"] {
            body.push_str(&data_line(&json!({"type": "transcript.text.delta", "delta": delta})));
        }
        body.push_str(&data_line(&json!({
            "type": "transcript.text.done",
            "text": TRANSCRIPT,
            "usage": {"type": "tokens", "input_tokens": 12, "output_tokens": 3, "total_tokens": 15}
        })));
        return sse(body);
    }

    match format.as_deref() {
        Some("text" | "srt" | "vtt") => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            format!("{TRANSCRIPT}\n"),
        )
            .into_response(),
        _ => Json(json!({
            "text": TRANSCRIPT,
            "language": "english",
            "duration": 1.5,
            "usage": {"type": "duration", "seconds": 2}
        }))
        .into_response(),
    }
}
