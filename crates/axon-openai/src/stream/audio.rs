use axon_core::types::{
    ModelParameters, SPEECH_CHUNK_OBJECT, Speech, TRANSCRIPTION_CHUNK_OBJECT, Transcription, UnifiedResponse,
};
use serde_json::Value;

use super::{ChunkAction, ChunkHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AudioKind {
    Speech,
    Transcription,
}

/// Forwards every audio chunk as it arrives
///
/// The chunk carrying usage is the last one: it gets the request
/// parameters and ends the stream.
#[derive(Debug)]
pub(crate) struct AudioRelay {
    kind: AudioKind,
    provider: String,
    model: String,
    params: Option<ModelParameters>,
    next_index: u32,
}

impl AudioRelay {
    pub(crate) fn new(
        kind: AudioKind,
        provider: impl Into<String>,
        model: impl Into<String>,
        params: Option<ModelParameters>,
    ) -> Self {
        Self {
            kind,
            provider: provider.into(),
            model: model.into(),
            params,
            next_index: 0,
        }
    }
}

impl ChunkHandler for AudioRelay {
    fn on_chunk(&mut self, chunk: Value) -> Result<ChunkAction, serde_json::Error> {
        let mut response = UnifiedResponse {
            model: self.model.clone(),
            ..Default::default()
        };

        let is_last = match self.kind {
            AudioKind::Speech => {
                let speech: Speech = serde_json::from_value(chunk)?;
                let is_last = speech.usage.is_some();
                response.object = SPEECH_CHUNK_OBJECT.to_owned();
                response.speech = Some(speech);
                is_last
            }
            AudioKind::Transcription => {
                let transcription: Transcription = serde_json::from_value(chunk)?;
                let is_last = transcription.usage.is_some();
                response.object = TRANSCRIPTION_CHUNK_OBJECT.to_owned();
                response.transcribe = Some(transcription);
                is_last
            }
        };

        response.extra_fields.provider.clone_from(&self.provider);
        response.extra_fields.chunk_index = Some(self.next_index);
        self.next_index += 1;

        if is_last {
            response.extra_fields.params = self.params.take();
            Ok(ChunkAction::Finish(response))
        } else {
            Ok(ChunkAction::Forward(response))
        }
    }

    fn on_end(self) -> Option<UnifiedResponse> {
        None
    }
}
