use axon_core::types::{ModelParameters, TranscriptionInput};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// Filename sent with the audio part; the vendor sniffs the real format
const AUDIO_FILE_NAME: &str = "audio.mp3";

/// One field of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, bytes: Vec<u8> },
}

/// Ordered multipart body, convertible into a `reqwest` form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    pub parts: Vec<FormPart>,
}

impl MultipartPayload {
    fn text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Value of the first text field called `name`
    pub fn field(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Convert into a `reqwest` form, keeping field order
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File { name, file_name, bytes } => form.part(
                    name,
                    Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str("application/octet-stream")?,
                ),
            };
        }
        Ok(form)
    }
}

/// Build the `/v1/audio/transcriptions` multipart body
///
/// Array-valued extras become repeated `key[]` fields; string extras are
/// sent raw and any other value as its JSON text.
pub fn transcription_payload(
    model: &str,
    input: &TranscriptionInput,
    params: Option<&ModelParameters>,
    stream: bool,
) -> MultipartPayload {
    let mut payload = MultipartPayload::default();

    if stream {
        payload.text("stream", "true");
    }

    payload.parts.push(FormPart::File {
        name: "file".to_owned(),
        file_name: AUDIO_FILE_NAME.to_owned(),
        bytes: input.file.clone(),
    });
    payload.text("model", model);

    if let Some(language) = &input.language {
        payload.text("language", language.as_str());
    }
    if let Some(prompt) = &input.prompt {
        payload.text("prompt", prompt.as_str());
    }
    if let Some(format) = &input.response_format {
        payload.text("response_format", format.as_str());
    }

    if let Some(params) = params {
        for (key, value) in &params.extra_params {
            match value {
                Value::Array(items) => {
                    let name = format!("{key}[]");
                    for item in items {
                        payload.text(name.as_str(), field_text(item));
                    }
                }
                other => payload.text(key.as_str(), field_text(other)),
            }
        }
    }

    payload
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
