use axon_core::types::{ContentBlock, ImageUrl, Message, MessageContent, ModelParameters, Role, ToolCall};
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::params::prepare_params;
use crate::image::sanitize_or_keep;

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: WireContent<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<&'a [ToolCall]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Blocks(Vec<ContentBlock>),
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let content = match &message.content {
            MessageContent::Text(text) => WireContent::Text(text),
            // assistant output goes back exactly as the model produced it
            MessageContent::Blocks(blocks) if message.role == Role::Assistant => WireContent::Blocks(blocks.clone()),
            MessageContent::Blocks(blocks) => WireContent::Blocks(blocks.iter().map(sanitize_block).collect()),
        };

        let tool_calls = match message.role {
            Role::Assistant => message.tool_calls.as_deref(),
            _ => None,
        };

        let tool_call_id = match message.role {
            Role::Tool => message.tool_call_id.as_deref(),
            _ => None,
        };

        Self {
            role: message.role,
            content,
            tool_calls,
            tool_call_id,
        }
    }
}

fn sanitize_block(block: &ContentBlock) -> ContentBlock {
    match block {
        ContentBlock::ImageUrl { image_url } => ContentBlock::ImageUrl {
            image_url: ImageUrl {
                url: sanitize_or_keep(&image_url.url),
                detail: image_url.detail.clone(),
            },
        },
        other => other.clone(),
    }
}

/// Build the `/v1/chat/completions` body
///
/// Streaming requests ask the vendor to append a usage chunk. Parameters are
/// merged last, so extras override any of the base keys.
pub fn chat_payload(
    model: &str,
    messages: &[Message],
    params: Option<&ModelParameters>,
    stream: bool,
) -> Result<Value, serde_json::Error> {
    let wire: Vec<WireMessage<'_>> = messages.iter().map(WireMessage::from).collect();

    let mut body = Map::new();
    body.insert("model".to_owned(), Value::from(model));
    body.insert("messages".to_owned(), serde_json::to_value(wire)?);
    if stream {
        body.insert("stream".to_owned(), Value::Bool(true));
        body.insert("stream_options".to_owned(), json!({"include_usage": true}));
    }

    super::merge(&mut body, prepare_params(params)?);

    Ok(Value::Object(body))
}
