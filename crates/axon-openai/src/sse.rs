//! Line-level decoding of the vendor's event stream

use serde_json::Value;

use crate::alias::{ChoiceField, apply_choice_aliases};

/// Classification of one raw stream line
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    /// Blank line, comment or SSE field the adapter does not use
    Skip,
    /// `data: [DONE]`
    Done,
    /// JSON candidate
    Payload(&'a str),
}

pub(crate) fn parse_line(line: &str) -> Line<'_> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() || line.starts_with(':') {
        return Line::Skip;
    }

    let payload = match line.strip_prefix("data:") {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None if is_sse_field(line) => return Line::Skip,
        // some backends write bare JSON lines, errors in particular
        None => line,
    };

    let payload = payload.trim();
    if payload.is_empty() {
        Line::Skip
    } else if payload == "[DONE]" {
        Line::Done
    } else {
        Line::Payload(payload)
    }
}

fn is_sse_field(line: &str) -> bool {
    ["event:", "id:", "retry:"].iter().any(|field| line.starts_with(field))
}

/// A decoded payload
#[derive(Debug)]
pub(crate) enum Payload {
    /// Object with a non-null `error` key, undecoded
    Error(Value),
    /// Chunk with vendor aliases already applied
    Chunk(Value),
}

pub(crate) fn decode_payload(payload: &str) -> Result<Payload, serde_json::Error> {
    let mut tree: Value = serde_json::from_str(payload)?;

    if tree.get("error").is_some_and(|e| !e.is_null()) {
        return Ok(Payload::Error(tree));
    }

    apply_choice_aliases(&mut tree, ChoiceField::Delta);
    Ok(Payload::Chunk(tree))
}
