use axon_core::types::{EmbeddingInput, ModelParameters};
use serde_json::{Map, Value};

/// Build the `/v1/embeddings` body
///
/// Only the embedding-relevant named parameters are sent; extras are
/// applied after them.
pub fn embedding_payload(
    model: &str,
    input: &EmbeddingInput,
    params: Option<&ModelParameters>,
) -> Result<Value, serde_json::Error> {
    let mut body = Map::new();
    body.insert("input".to_owned(), serde_json::to_value(input)?);
    body.insert("model".to_owned(), Value::from(model));

    if let Some(params) = params {
        if let Some(format) = &params.encoding_format {
            body.insert("encoding_format".to_owned(), Value::from(format.as_str()));
        }
        if let Some(dimensions) = params.dimensions {
            body.insert("dimensions".to_owned(), Value::from(dimensions));
        }
        if let Some(user) = &params.user {
            body.insert("user".to_owned(), Value::from(user.as_str()));
        }
        super::merge(&mut body, params.extra_params.clone());
    }

    Ok(Value::Object(body))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn batch_input() {
        let input = EmbeddingInput::Multiple(vec!["a".to_owned(), "b".to_owned()]);
        let body = embedding_payload("text-embedding-3-small", &input, None).unwrap();
        assert_eq!(body, json!({"input": ["a", "b"], "model": "text-embedding-3-small"}));
    }

    #[test]
    fn embedding_params_only() {
        let params = ModelParameters {
            encoding_format: Some("base64".to_owned()),
            dimensions: Some(256),
            temperature: Some(0.9),
            ..Default::default()
        }
        .with_extra("dimensions", 512);

        let body = embedding_payload("m", &EmbeddingInput::Single("x".to_owned()), Some(&params)).unwrap();
        assert_eq!(body["encoding_format"], json!("base64"));
        assert_eq!(body["dimensions"], json!(512));
        assert!(body.get("temperature").is_none());
    }
}
