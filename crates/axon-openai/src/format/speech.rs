use axon_core::types::{ModelParameters, SpeechInput};
use serde_json::{Map, Value};

/// Audio format requested when the caller does not pick one
pub const DEFAULT_SPEECH_FORMAT: &str = "mp3";

/// Build the `/v1/audio/speech` body
///
/// Streaming asks for SSE framing. Extra parameters are merged over the
/// whole payload.
pub fn speech_payload(model: &str, input: &SpeechInput, params: Option<&ModelParameters>, stream: bool) -> Value {
    let mut body = Map::new();
    body.insert("input".to_owned(), Value::from(input.input.as_str()));
    body.insert("model".to_owned(), Value::from(model));
    body.insert("voice".to_owned(), Value::from(input.voice.as_str()));
    body.insert(
        "instructions".to_owned(),
        Value::from(input.instructions.as_deref().unwrap_or_default()),
    );
    body.insert(
        "response_format".to_owned(),
        Value::from(input.response_format.as_deref().unwrap_or(DEFAULT_SPEECH_FORMAT)),
    );

    if stream {
        body.insert("stream_format".to_owned(), Value::from("sse"));
    }

    if let Some(params) = params {
        super::merge(&mut body, params.extra_params.clone());
    }

    Value::Object(body)
}
