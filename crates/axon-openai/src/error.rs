//! Vendor error envelope classification

use axon_core::{ErrorField, ErrorKind, UnifiedError};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    error: WireError,
    #[serde(default)]
    event_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    param: Option<Value>,
    #[serde(default)]
    event_id: Option<String>,
}

impl From<Envelope> for UnifiedError {
    fn from(envelope: Envelope) -> Self {
        let error = ErrorField {
            kind: envelope.error.kind,
            code: envelope.error.code.and_then(scalar_text),
            message: envelope.error.message.unwrap_or_default(),
            param: envelope.error.param.and_then(scalar_text),
            event_id: envelope.error.event_id,
        };
        Self::api(error, envelope.event_id, None)
    }
}

/// Render string or numeric codes as text; null and structured values are dropped
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Classify a non-success HTTP response body
pub(crate) fn from_response(status: u16, body: &[u8]) -> UnifiedError {
    match serde_json::from_slice::<Envelope>(body) {
        Ok(envelope) => UnifiedError::from(envelope).with_status(status),
        Err(e) => {
            tracing::debug!(status, body = %String::from_utf8_lossy(body), "unrecognized error body");
            UnifiedError::new(ErrorKind::EnvelopeDecode).with_status(status).with_source(e)
        }
    }
}

/// Decode an error object received mid-stream
pub(crate) fn from_stream_value(tree: Value) -> Result<UnifiedError, serde_json::Error> {
    serde_json::from_value::<Envelope>(tree).map(UnifiedError::from)
}
