//! Google Gemini request format.
//!
//! - Messages are called "contents"
//! - Role is "user" or "model" (not "assistant")
//! - Content is an array of "parts"
//! - System instructions are separate from messages
//! - Requested tool calls travel as `functionCall` parts on a model turn
//! - Function results travel as `functionResponse` parts on the user turn that
//!   immediately follows it

use counsel_core::{Message, MessageContent, Role, ToolCall, ToolSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    /// "user" or "model"
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    fn function_call(call: &ToolCall) -> Self {
        // Arguments were validated before dispatch; anything else degrades to `{}`.
        let args = serde_json::from_str::<Value>(&call.function.arguments)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));

        Self {
            function_call: Some(GeminiFunctionCall {
                name: call.function.name.trim().to_string(),
                args,
            }),
            ..Self::default()
        }
    }

    fn function_response(message: &Message) -> Self {
        Self {
            function_response: Some(GeminiFunctionResponse {
                name: message.name.clone().unwrap_or_default(),
                response: function_response_body(&message.content),
            }),
            ..Self::default()
        }
    }

    fn is_function_response(&self) -> bool {
        self.function_response.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionCall {
    pub name: String,
    pub args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionResponse {
    pub name: String,
    /// Must be a JSON object; other values are wrapped as `{"result": value}`.
    pub response: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// Convert a conversation log into a Gemini request.
///
/// Consecutive turns with the same role are merged, and within a user turn
/// function responses come before text, so each `functionCall` turn is
/// directly followed by its responses. A function result whose call is no
/// longer in the log (evicted by the budget) is sent as plain text instead.
pub fn to_gemini_request(messages: &[Message], tools: &[ToolSchema]) -> GeminiRequest {
    let mut system_parts = Vec::new();
    let mut contents: Vec<GeminiContent> = Vec::new();
    let mut pending_calls: Vec<String> = Vec::new();

    for message in messages {
        match message.role {
            Role::System => system_parts.push(GeminiPart::text(message.text())),
            Role::User => {
                push_part(&mut contents, "user", GeminiPart::text(message.text()));
            }
            Role::Assistant => {
                let text = message.text();
                // Model turns with neither text nor calls are not sent.
                if !text.is_empty() {
                    push_part(&mut contents, "model", GeminiPart::text(text));
                }
                for call in &message.tool_calls {
                    push_part(&mut contents, "model", GeminiPart::function_call(call));
                    pending_calls.push(call.function.name.trim().to_string());
                }
            }
            Role::Function => {
                let name = message.name.as_deref().unwrap_or_default();
                match pending_calls.iter().position(|pending| pending == name) {
                    Some(position) => {
                        pending_calls.remove(position);
                        push_part(&mut contents, "user", GeminiPart::function_response(message));
                    }
                    None => push_part(
                        &mut contents,
                        "user",
                        GeminiPart::text(format!("Result of {}: {}", name, message.text())),
                    ),
                }
            }
        }
    }

    let system_instruction = (!system_parts.is_empty()).then(|| GeminiContent {
        role: "user".to_string(),
        parts: system_parts,
    });

    let tools = (!tools.is_empty()).then(|| {
        vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|tool| GeminiFunctionDeclaration {
                    name: tool.function.name.clone(),
                    description: Some(tool.function.description.clone()),
                    parameters: tool.function.parameters.clone(),
                })
                .collect(),
        }]
    });

    GeminiRequest {
        contents,
        system_instruction,
        tools,
        generation_config: None,
    }
}

fn push_part(contents: &mut Vec<GeminiContent>, role: &str, part: GeminiPart) {
    match contents.last_mut() {
        Some(last) if last.role == role => {
            if part.is_function_response() {
                let at = last
                    .parts
                    .iter()
                    .take_while(|existing| existing.is_function_response())
                    .count();
                last.parts.insert(at, part);
            } else {
                last.parts.push(part);
            }
        }
        _ => contents.push(GeminiContent {
            role: role.to_string(),
            parts: vec![part],
        }),
    }
}

fn function_response_body(content: &MessageContent) -> Value {
    match content {
        MessageContent::FunctionResult(value) if value.is_object() => value.clone(),
        MessageContent::FunctionResult(value) => json!({ "result": value }),
        MessageContent::Text(text) => json!({ "result": text }),
    }
}
