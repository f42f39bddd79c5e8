//! OpenAI-compatible request serialization and stream parsing.
//!
//! Messages go out as `{role, content, name?}` with function results flattened
//! to JSON text, which is the legacy `function` role shape. Tool-call deltas
//! come back indexed and are passed through untouched for reassembly.

use counsel_core::{Message, ToolCallDelta, ToolSchema};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::Result;
use crate::types::LLMChunk;

/// Convert internal [`Message`] values to an OpenAI-compatible JSON array.
///
/// Internal fields like `id`, `visible` and `created_at` are never sent.
pub fn messages_to_openai_compat_json(messages: &[Message]) -> Vec<Value> {
    messages.iter().map(Message::wire_value).collect()
}

/// Convert internal [`ToolSchema`] values to the OpenAI `tools` array JSON.
pub fn tools_to_openai_compat_json(tools: &[ToolSchema]) -> Vec<Value> {
    tools.iter().map(|t| json!(t)).collect()
}

/// Build a standard OpenAI-compatible streaming chat request body.
pub fn build_openai_compat_body(
    model: &str,
    messages: &[Message],
    tools: &[ToolSchema],
    max_output_tokens: Option<u32>,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages_to_openai_compat_json(messages),
        "stream": true,
    });

    // `tools` is omitted entirely when none are offered.
    if !tools.is_empty() {
        body["tools"] = json!(tools_to_openai_compat_json(tools));
    }

    if let Some(max_tokens) = max_output_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    body
}

// --- OpenAI-compatible streaming chunk parsing ---

#[derive(Debug, Deserialize)]
pub struct OpenAICompatStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAICompatChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatChoice {
    #[serde(default)]
    delta: OpenAICompatDelta,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAICompatDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAICompatToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatToolCallDelta {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<OpenAICompatFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatFunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

/// Convert a single OpenAI-compatible stream chunk into zero or more [`LLMChunk`]s.
///
/// A delta carrying both text and tool-call fragments yields both, text first.
pub fn parse_openai_compat_chunk(chunk: OpenAICompatStreamChunk) -> Vec<LLMChunk> {
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Vec::new();
    };

    let mut out = Vec::new();

    if let Some(content) = choice.delta.content.filter(|content| !content.is_empty()) {
        out.push(LLMChunk::Token(content));
    }

    if let Some(tool_calls) = choice.delta.tool_calls {
        let deltas: Vec<ToolCallDelta> = tool_calls
            .into_iter()
            .map(|tc| {
                let (name, arguments) = match tc.function {
                    Some(function) => (function.name, function.arguments),
                    None => (None, None),
                };
                ToolCallDelta {
                    index: tc.index,
                    id: tc.id,
                    name,
                    arguments,
                }
            })
            .collect();

        if !deltas.is_empty() {
            out.push(LLMChunk::ToolCallDeltas(deltas));
        }
    }

    out
}

/// Parse an SSE `data:` payload.
///
/// - `"[DONE]"` -> `LLMChunk::Done`
/// - Invalid JSON -> error
pub fn parse_openai_compat_sse_data(data: &str) -> Result<Vec<LLMChunk>> {
    if data.trim() == "[DONE]" {
        return Ok(vec![LLMChunk::Done]);
    }

    let chunk: OpenAICompatStreamChunk = serde_json::from_str(data)?;
    Ok(parse_openai_compat_chunk(chunk))
}
