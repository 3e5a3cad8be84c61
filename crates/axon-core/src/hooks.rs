use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::UnifiedError;
use crate::types::UnifiedResponse;

/// Outcome of one request or one stream event
pub type Outcome = Result<UnifiedResponse, UnifiedError>;

/// Sink invoked on every stream event before it is sent to the caller
///
/// Implementations may rewrite the outcome. Inspect
/// [`RequestContext::is_stream_end`] to detect the terminal event.
#[async_trait]
pub trait PostHookRunner: Send + Sync {
    async fn run(&self, ctx: &RequestContext, outcome: Outcome) -> Outcome;
}

/// Hook runner that returns every outcome unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

#[async_trait]
impl PostHookRunner for NoopHooks {
    async fn run(&self, _ctx: &RequestContext, outcome: Outcome) -> Outcome {
        outcome
    }
}
