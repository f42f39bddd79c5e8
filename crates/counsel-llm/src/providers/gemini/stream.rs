//! Gemini SSE stream parser.
//!
//! Each event is a JSON object:
//! ```text
//! data: {"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]}
//!
//! data: {"candidates":[{"content":{"parts":[{"functionCall":{"name":"search","args":{"q":"test"}}}],"role":"model"}}]}
//! ```
//!
//! The event carrying a `finishReason` ends the stream and yields
//! [`LLMChunk::Done`] after any parts it also carries.
//!
//! Gemini delivers function calls whole rather than as fragments. Each one is
//! surfaced as a single complete delta at a fresh index so the same
//! accumulator handles both providers.

use counsel_core::ToolCallDelta;
use serde_json::Value;

use crate::provider::{LLMError, Result};
use crate::types::LLMChunk;

#[derive(Debug, Default)]
pub struct GeminiStreamState {
    next_index: usize,
}

impl GeminiStreamState {
    fn next_delta(&mut self, name: &str, arguments: String) -> ToolCallDelta {
        let index = self.next_index;
        self.next_index += 1;

        ToolCallDelta::new(index)
            .with_id(format!("gemini_{index}"))
            .with_name(name)
            .with_arguments(arguments)
    }
}

/// Parse a single Gemini SSE event into zero or more [`LLMChunk`]s.
pub fn parse_gemini_sse_event(
    state: &mut GeminiStreamState,
    _event_type: &str,
    data: &str,
) -> Result<Vec<LLMChunk>> {
    let data = data.trim();

    if data.is_empty() || data == "[DONE]" {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(data)
        .map_err(|e| LLMError::Stream(format!("Failed to parse Gemini SSE data: {}: {}", e, data)))?;

    if let Some(error) = value.get("error") {
        let error_msg = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown Gemini API error");
        return Err(LLMError::Api(error_msg.to_string()));
    }

    let parts = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let finished = value
        .pointer("/candidates/0/finishReason")
        .and_then(Value::as_str)
        .is_some_and(|reason| !reason.is_empty());

    let mut text = String::new();
    let mut deltas = Vec::new();

    for part in parts {
        if let Some(fragment) = part.get("text").and_then(Value::as_str) {
            text.push_str(fragment);
            continue;
        }

        if let Some(function_call) = part.get("functionCall") {
            let name = function_call
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    LLMError::Stream(format!("Missing function name in Gemini response: {}", data))
                })?;

            let args = function_call
                .get("args")
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

            deltas.push(state.next_delta(name, args.to_string()));
        }
    }

    let mut chunks = Vec::new();
    if !text.is_empty() {
        chunks.push(LLMChunk::Token(text));
    }
    if !deltas.is_empty() {
        chunks.push(LLMChunk::ToolCallDeltas(deltas));
    }
    if finished {
        chunks.push(LLMChunk::Done);
    }

    Ok(chunks)
}
