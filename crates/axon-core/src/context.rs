use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

/// Per-request context handed to every provider operation
///
/// Streaming workers take their own copy; the `stream_end` flag on that copy
/// is set before the terminal event reaches the post hook.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Caller-supplied API key that overrides the configured one
    pub api_key: Option<SecretString>,
    cancellation: CancellationToken,
    stream_end: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Tie this request to an existing token, e.g. one cancelled on Ctrl-C
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub const fn mark_stream_end(&mut self) {
        self.stream_end = true;
    }

    pub const fn is_stream_end(&self) -> bool {
        self.stream_end
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let ctx = RequestContext::new();
        let worker = ctx.clone();
        ctx.cancel();
        assert!(worker.is_cancelled());
    }

    #[test]
    fn stream_end_is_per_copy() {
        let ctx = RequestContext::new().with_api_key("sk-test");
        let mut worker = ctx.clone();
        worker.mark_stream_end();
        assert!(worker.is_stream_end());
        assert!(!ctx.is_stream_end());
        assert_eq!(worker.api_key.unwrap().expose_secret(), "sk-test");
    }
}
