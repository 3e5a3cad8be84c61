use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a [`UnifiedError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Payload could not be built or serialized; no request was sent
    Marshal,
    /// Transport failure (connect, timeout, body read)
    Request,
    /// Caller cancelled a buffered request
    Cancelled,
    /// Error reported by the vendor in its error envelope
    Api,
    /// Vendor error envelope could not be decoded
    EnvelopeDecode,
    /// Success body did not match the expected shape
    ResponseDecode,
    /// Raw response echo could not be decoded
    RawResponseDecode,
    /// Failure while reading a live stream
    StreamRead,
    /// Operation is disabled or not implemented by the provider
    UnsupportedOperation,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marshal => "marshal",
            Self::Request => "request",
            Self::Cancelled => "cancelled",
            Self::Api => "api",
            Self::EnvelopeDecode => "envelope_decode",
            Self::ResponseDecode => "response_decode",
            Self::RawResponseDecode => "raw_response_decode",
            Self::StreamRead => "stream_read",
            Self::UnsupportedOperation => "unsupported_operation",
        }
    }

    /// Message used when the error carries no vendor-provided text
    const fn default_message(self) -> &'static str {
        match self {
            Self::Marshal => "failed to marshal request body to JSON",
            Self::Request => "failed to make HTTP request to provider API",
            Self::Cancelled => "request cancelled by caller",
            Self::Api => "provider API returned an error",
            Self::EnvelopeDecode => "failed to decode error response from provider API",
            Self::ResponseDecode => "failed to unmarshal response from provider API",
            Self::RawResponseDecode => "failed to decode raw response from provider API",
            Self::StreamRead => "error reading stream from provider API",
            Self::UnsupportedOperation => "operation not supported",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor-style error body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorField {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// Error returned by every provider operation and carried on stream channels
///
/// Vendor-reported failures (`ErrorKind::Api`) keep the vendor's
/// classification fields intact in `error`; local failures carry a fixed
/// message and, where one exists, the underlying `source`.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{kind}: {}", .error.message)]
pub struct UnifiedError {
    pub kind: ErrorKind,
    /// Provider key the error originated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// HTTP status of the failed response, when one was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Top-level event id from the vendor envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub error: ErrorField,
    #[serde(skip)]
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl UnifiedError {
    /// Error of `kind` with its default message
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_message(kind, kind.default_message())
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            provider: None,
            status_code: None,
            event_id: None,
            error: ErrorField {
                message: message.into(),
                ..ErrorField::default()
            },
            source: None,
        }
    }

    /// Vendor-reported error decoded from an envelope
    pub fn api(error: ErrorField, event_id: Option<String>, status_code: Option<u16>) -> Self {
        Self {
            kind: ErrorKind::Api,
            provider: None,
            status_code,
            event_id,
            error,
            source: None,
        }
    }

    pub fn marshal(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorKind::Marshal).with_source(source)
    }

    pub fn request(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorKind::Request).with_source(source)
    }

    pub fn response_decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorKind::ResponseDecode).with_source(source)
    }

    pub fn raw_response_decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorKind::RawResponseDecode).with_source(source)
    }

    pub fn stream_read(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorKind::StreamRead).with_source(source)
    }

    /// Buffered request abandoned because the caller cancelled it
    pub fn cancelled() -> Self {
        let mut error = Self::new(ErrorKind::Cancelled);
        error.error.kind = Some("request_cancelled".to_owned());
        error
    }

    /// `operation` is disabled or not implemented for `provider`
    pub fn unsupported(operation: &str, provider: &str) -> Self {
        let mut error = Self::with_message(
            ErrorKind::UnsupportedOperation,
            format!("{operation} is not supported by {provider} provider"),
        );
        error.error.code = Some("unsupported_operation".to_owned());
        error.provider = Some(provider.to_owned());
        error
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Whether the vendor reported this error, as opposed to a local failure
    pub const fn is_vendor_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Api)
    }
}
