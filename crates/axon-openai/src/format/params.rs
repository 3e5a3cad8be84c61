use axon_core::types::ModelParameters;
use serde::Serialize;
use serde_json::{Map, Value};

/// Flatten named parameters into wire keys, then lay the extras over them
///
/// `stop_sequences` is sent as `stop`. Extra parameters win on collision.
pub fn prepare_params(params: Option<&ModelParameters>) -> Result<Map<String, Value>, serde_json::Error> {
    let mut out = Map::new();
    let Some(p) = params else {
        return Ok(out);
    };

    put(&mut out, "temperature", p.temperature)?;
    put(&mut out, "top_p", p.top_p)?;
    put(&mut out, "top_k", p.top_k)?;
    put(&mut out, "max_tokens", p.max_tokens)?;
    put(&mut out, "stop", p.stop_sequences.as_ref())?;
    put(&mut out, "presence_penalty", p.presence_penalty)?;
    put(&mut out, "frequency_penalty", p.frequency_penalty)?;
    put(&mut out, "parallel_tool_calls", p.parallel_tool_calls)?;
    put(&mut out, "tools", p.tools.as_ref())?;
    put(&mut out, "tool_choice", p.tool_choice.as_ref())?;
    put(&mut out, "encoding_format", p.encoding_format.as_ref())?;
    put(&mut out, "dimensions", p.dimensions)?;
    put(&mut out, "user", p.user.as_ref())?;

    super::merge(&mut out, p.extra_params.clone());

    Ok(out)
}

fn put<T: Serialize>(out: &mut Map<String, Value>, key: &str, value: Option<T>) -> Result<(), serde_json::Error> {
    if let Some(value) = value {
        out.insert(key.to_owned(), serde_json::to_value(value)?);
    }
    Ok(())
}
