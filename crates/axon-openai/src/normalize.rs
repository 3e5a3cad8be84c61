//! Buffered response decoding

use axon_core::UnifiedError;
use axon_core::types::{
    ModelParameters, SPEECH_OBJECT, Speech, TRANSCRIPTION_OBJECT, Transcription, TranscriptionInput, UnifiedResponse,
};
use serde_json::Value;

use crate::alias::{ChoiceField, apply_choice_aliases};

/// Request-side facts every normalized response carries
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stamp<'a> {
    pub provider: &'a str,
    pub params: Option<&'a ModelParameters>,
    pub send_back_raw_response: bool,
}

impl Stamp<'_> {
    fn apply(&self, response: &mut UnifiedResponse) {
        response.extra_fields.provider = self.provider.to_owned();
        response.extra_fields.params = self.params.cloned();
    }
}

pub(crate) fn chat(body: &[u8], stamp: &Stamp<'_>) -> Result<UnifiedResponse, UnifiedError> {
    let mut tree: Value = serde_json::from_slice(body).map_err(UnifiedError::response_decode)?;
    apply_choice_aliases(&mut tree, ChoiceField::Message);

    let raw = stamp.send_back_raw_response.then(|| tree.clone());
    let mut response: UnifiedResponse = serde_json::from_value(tree).map_err(UnifiedError::response_decode)?;

    stamp.apply(&mut response);
    response.extra_fields.raw_response = raw;
    Ok(response)
}

pub(crate) fn embedding(body: &[u8], stamp: &Stamp<'_>) -> Result<UnifiedResponse, UnifiedError> {
    let mut response: UnifiedResponse = serde_json::from_slice(body).map_err(UnifiedError::response_decode)?;

    if stamp.send_back_raw_response {
        let raw: Value = serde_json::from_slice(body).map_err(UnifiedError::raw_response_decode)?;
        response.extra_fields.raw_response = Some(raw);
    }

    stamp.apply(&mut response);
    Ok(response)
}

/// The body is the audio itself
pub(crate) fn speech(body: &[u8], model: &str, stamp: &Stamp<'_>) -> UnifiedResponse {
    let mut response = UnifiedResponse {
        object: SPEECH_OBJECT.to_owned(),
        model: model.to_owned(),
        speech: Some(Speech {
            audio: body.to_vec(),
            ..Default::default()
        }),
        ..Default::default()
    };
    stamp.apply(&mut response);
    response
}

/// Plain-text formats (`text`, `srt`, `vtt`) become the transcript text
pub(crate) fn transcription(
    body: &[u8],
    model: &str,
    input: &TranscriptionInput,
    stamp: &Stamp<'_>,
) -> Result<UnifiedResponse, UnifiedError> {
    let transcription = if input.expects_plain_text() {
        Transcription {
            text: String::from_utf8_lossy(body).into_owned(),
            ..Default::default()
        }
    } else {
        serde_json::from_slice(body).map_err(UnifiedError::response_decode)?
    };

    let mut response = UnifiedResponse {
        object: TRANSCRIPTION_OBJECT.to_owned(),
        model: model.to_owned(),
        transcribe: Some(transcription),
        ..Default::default()
    };

    if stamp.send_back_raw_response && !input.expects_plain_text() {
        let raw: Value = serde_json::from_slice(body).map_err(UnifiedError::raw_response_decode)?;
        response.extra_fields.raw_response = Some(raw);
    }

    stamp.apply(&mut response);
    Ok(response)
}
