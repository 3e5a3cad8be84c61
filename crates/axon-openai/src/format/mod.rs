//! Wire payload construction for each operation

pub mod chat;
pub mod embedding;
pub mod params;
pub mod speech;
pub mod transcription;

use serde_json::{Map, Value};

pub use chat::chat_payload;
pub use embedding::embedding_payload;
pub use speech::speech_payload;
pub use transcription::{FormPart, MultipartPayload, transcription_payload};

/// Merge `overrides` into `base`; keys in `overrides` win
pub(crate) fn merge(base: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, value) in overrides {
        base.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn later_keys_override_earlier() {
        let mut base = json!({"model": "a", "n": 1}).as_object().cloned().unwrap();
        let overrides = json!({"model": "b", "seed": 7}).as_object().cloned().unwrap();
        merge(&mut base, overrides);
        assert_eq!(Value::Object(base), json!({"model": "b", "n": 1, "seed": 7}));
    }
}
