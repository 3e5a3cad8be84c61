use serde::{Deserialize, Serialize};

use super::response::UnifiedResponse;
use crate::error::UnifiedError;

/// One event delivered on a stream channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(flatten)]
    pub payload: StreamPayload,
    /// Set on the last event of the stream
    #[serde(default)]
    pub stream_end: bool,
}

/// Either a response increment or a terminal error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamPayload {
    Response(Box<UnifiedResponse>),
    Error(UnifiedError),
}

impl StreamEvent {
    /// Intermediate response event
    pub fn response(response: UnifiedResponse) -> Self {
        Self {
            payload: StreamPayload::Response(Box::new(response)),
            stream_end: false,
        }
    }

    /// Error event; chain [`terminal`](Self::terminal) when it ends the stream
    pub fn error(error: UnifiedError) -> Self {
        Self {
            payload: StreamPayload::Error(error),
            stream_end: false,
        }
    }

    /// Mark this event as the last one
    #[must_use]
    pub const fn terminal(mut self) -> Self {
        self.stream_end = true;
        self
    }

    pub fn as_response(&self) -> Option<&UnifiedResponse> {
        match &self.payload {
            StreamPayload::Response(response) => Some(response),
            StreamPayload::Error(_) => None,
        }
    }

    pub fn as_response_mut(&mut self) -> Option<&mut UnifiedResponse> {
        match &mut self.payload {
            StreamPayload::Response(response) => Some(response),
            StreamPayload::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&UnifiedError> {
        match &self.payload {
            StreamPayload::Error(error) => Some(error),
            StreamPayload::Response(_) => None,
        }
    }
}
