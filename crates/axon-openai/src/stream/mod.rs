//! Stream worker: reads vendor lines, normalizes chunks, feeds the event channel

mod audio;
mod chat;

use std::sync::Arc;

use axon_core::types::{StreamEvent, UnifiedResponse};
use axon_core::{Outcome, PostHookRunner, RequestContext, UnifiedError};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

pub(crate) use audio::{AudioKind, AudioRelay};
pub(crate) use chat::ChatAccumulator;

use crate::error;
use crate::sse::{self, Line, Payload};

/// What to do with one decoded chunk
#[derive(Debug)]
pub(crate) enum ChunkAction {
    /// Metadata only; nothing is sent
    Skip,
    /// Send as an intermediate event
    Forward(UnifiedResponse),
    /// Send as the terminal event and stop reading
    Finish(UnifiedResponse),
}

/// Per-operation chunk normalization
pub(crate) trait ChunkHandler: Send {
    fn on_chunk(&mut self, chunk: Value) -> Result<ChunkAction, serde_json::Error>;

    /// Terminal event for a stream that ended without a `Finish` chunk
    fn on_end(self) -> Option<UnifiedResponse>;
}

/// Everything a worker needs besides the byte source and handler
pub(crate) struct Sink {
    pub ctx: RequestContext,
    pub hooks: Arc<dyn PostHookRunner>,
    pub tx: mpsc::Sender<StreamEvent>,
    pub provider: String,
}

impl Sink {
    /// Run the post hook and send; false when the stream should stop
    async fn deliver(&self, outcome: Outcome, stream_end: bool) -> bool {
        let event = match self.hooks.run(&self.ctx, outcome).await {
            Ok(response) => StreamEvent::response(response),
            Err(error) => StreamEvent::error(error),
        };
        let event = if stream_end { event.terminal() } else { event };

        tokio::select! {
            biased;
            () = self.ctx.cancellation().cancelled() => false,
            sent = self.tx.send(event) => sent.is_ok(),
        }
    }

    async fn finish(&mut self, outcome: Outcome) {
        self.ctx.mark_stream_end();
        self.deliver(outcome, true).await;
    }
}

/// Drive one stream to completion
///
/// Owns the reader and the sender; both are dropped on return, which closes
/// the channel exactly once on every exit path.
pub(crate) async fn drive<R, H>(reader: R, mut handler: H, mut sink: Sink)
where
    R: AsyncBufRead + Unpin,
    H: ChunkHandler,
{
    let cancel = sink.ctx.cancellation().clone();
    let mut lines = reader.lines();

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(provider = %sink.provider, "stream cancelled by caller");
                return;
            }
            next = lines.next_line() => next,
        };

        let line = match next {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(provider = %sink.provider, error = %e, "error reading stream");
                let error = UnifiedError::stream_read(e).with_provider(sink.provider.clone());
                sink.finish(Err(error)).await;
                return;
            }
        };

        let payload = match sse::parse_line(&line) {
            Line::Skip => continue,
            Line::Done => break,
            Line::Payload(payload) => payload,
        };

        let decoded = match sse::decode_payload(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(provider = %sink.provider, error = %e, "skipping malformed stream line");
                continue;
            }
        };

        match decoded {
            Payload::Error(tree) => match error::from_stream_value(tree) {
                Ok(error) => {
                    tracing::warn!(provider = %sink.provider, error = %error, "provider reported error mid-stream");
                    let error = error.with_provider(sink.provider.clone());
                    sink.finish(Err(error)).await;
                    return;
                }
                Err(e) => {
                    tracing::warn!(provider = %sink.provider, error = %e, "dropping undecodable stream error");
                }
            },
            Payload::Chunk(tree) => match handler.on_chunk(tree) {
                Ok(ChunkAction::Skip) => {}
                Ok(ChunkAction::Forward(response)) => {
                    if !sink.deliver(Ok(response), false).await {
                        return;
                    }
                }
                Ok(ChunkAction::Finish(response)) => {
                    sink.finish(Ok(response)).await;
                    return;
                }
                Err(e) => {
                    tracing::warn!(provider = %sink.provider, error = %e, "skipping undecodable stream chunk");
                }
            },
        }
    }

    if let Some(response) = handler.on_end() {
        sink.finish(Ok(response)).await;
    }
}
