use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::tools::types::ToolCall;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        }
    }
}

/// Message payload: plain text, or a structured tool result that is
/// serialized to text whenever it leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    FunctionResult(Value),
}

impl MessageContent {
    /// Text form sent to the provider.
    pub fn to_wire_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::FunctionResult(value) => value.to_string(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "generate_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub role: Role,
    pub content: MessageContent,
    /// Tool that produced a `function` message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Calls an `assistant` round requested whose results follow it in the log.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Rendering hint only; the provider always receives the full log.
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl Message {
    fn new(role: Role, content: MessageContent, visible: bool) -> Self {
        Self {
            id: generate_id(),
            role,
            content,
            name: None,
            tool_calls: Vec::new(),
            visible,
            created_at: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, MessageContent::Text(content.into()), false)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(content.into()), true)
    }

    /// A `user` turn the end user never typed (tool-result stitching).
    pub fn hidden_user(content: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(content.into()), false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(content.into()), true)
    }

    /// An `assistant` round that requested tools. A round with no text is
    /// scaffolding and stays hidden from the end user.
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let content = content.into();
        let visible = !content.is_empty();
        let mut message = Self::new(Role::Assistant, MessageContent::Text(content), visible);
        message.tool_calls = tool_calls;
        message
    }

    pub fn function_result(name: impl Into<String>, result: Value) -> Self {
        let mut message = Self::new(Role::Function, MessageContent::FunctionResult(result), false);
        message.name = Some(name.into());
        message
    }

    pub fn text(&self) -> String {
        self.content.to_wire_text()
    }

    /// Provider-facing shape: `{role, content, name?}` with content flattened to text.
    pub fn wire_value(&self) -> Value {
        let mut value = json!({
            "role": self.role.as_str(),
            "content": self.content.to_wire_text(),
        });

        if let Some(name) = &self.name {
            value["name"] = json!(name);
        }

        value
    }
}

/// Serialize a log exactly as it is sent to the provider.
pub fn serialize_log(messages: &[Message]) -> String {
    Value::Array(messages.iter().map(Message::wire_value).collect()).to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    /// Language code the session is budgeted with, fixed at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            language: None,
            created_at: now,
            last_active: now,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Messages meant for the end user, in log order.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|message| message.visible)
    }
}
