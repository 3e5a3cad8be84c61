use axon_core::types::{
    CHAT_CHUNK_OBJECT, Choice, ChoiceDelta, ExtraFields, ModelParameters, UnifiedResponse, Usage,
};
use serde_json::Value;

use super::{ChunkAction, ChunkHandler};

/// Cross-chunk state for a chat completion stream
///
/// Usage and finish reason are withheld from forwarded chunks and delivered
/// together on the synthetic final chunk.
#[derive(Debug)]
pub(crate) struct ChatAccumulator {
    provider: String,
    model: String,
    params: Option<ModelParameters>,
    usage: Usage,
    finish_reason: Option<String>,
    id: Option<String>,
    forwarded: u32,
}

impl ChatAccumulator {
    pub(crate) fn new(provider: impl Into<String>, model: impl Into<String>, params: Option<ModelParameters>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            params,
            usage: Usage::default(),
            finish_reason: None,
            id: None,
            forwarded: 0,
        }
    }
}

impl ChunkHandler for ChatAccumulator {
    fn on_chunk(&mut self, chunk: Value) -> Result<ChunkAction, serde_json::Error> {
        let mut chunk: UnifiedResponse = serde_json::from_value(chunk)?;

        if let Some(usage) = chunk.usage.take() {
            self.usage.absorb(&usage);
        }

        if self.id.is_none() && !chunk.id.is_empty() {
            self.id = Some(chunk.id.clone());
        }

        let Some(choice) = chunk.choices.first_mut() else {
            return Ok(ChunkAction::Skip);
        };

        if let Some(reason) = choice.finish_reason.take().filter(|r| !r.is_empty()) {
            self.finish_reason = Some(reason);
        }

        if !choice.delta.as_ref().is_some_and(ChoiceDelta::has_payload) {
            return Ok(ChunkAction::Skip);
        }

        chunk.extra_fields.provider.clone_from(&self.provider);
        chunk.extra_fields.chunk_index = Some(self.forwarded);
        self.forwarded += 1;

        Ok(ChunkAction::Forward(chunk))
    }

    fn on_end(self) -> Option<UnifiedResponse> {
        Some(UnifiedResponse {
            id: self.id.unwrap_or_default(),
            object: CHAT_CHUNK_OBJECT.to_owned(),
            model: self.model,
            choices: vec![Choice {
                index: 0,
                delta: Some(ChoiceDelta::default()),
                finish_reason: self.finish_reason,
                ..Default::default()
            }],
            usage: Some(self.usage),
            extra_fields: ExtraFields {
                provider: self.provider,
                params: self.params,
                raw_response: None,
                chunk_index: Some(self.forwarded),
            },
            ..Default::default()
        })
    }
}
