use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tools::{FunctionCall, ToolCall};

/// One streamed fragment of a tool call at a provider-assigned position.
///
/// Every field except `index` is a fragment to append, not a value to set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl ToolCallDelta {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Reassembles indexed tool-call deltas for the lifetime of one stream.
#[derive(Debug, Default, Clone)]
pub struct ToolCallAccumulator {
    parts: BTreeMap<usize, PartialToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, delta: ToolCallDelta) {
        let part = self.parts.entry(delta.index).or_default();

        if let Some(id) = delta.id {
            part.id.push_str(&id);
        }
        if let Some(name) = delta.name {
            part.name.push_str(&name);
        }
        if let Some(arguments) = delta.arguments {
            part.arguments.push_str(&arguments);
        }
    }

    pub fn extend<I>(&mut self, deltas: I)
    where
        I: IntoIterator<Item = ToolCallDelta>,
    {
        for delta in deltas {
            self.update(delta);
        }
    }

    pub fn get(&self, index: usize) -> Option<&PartialToolCall> {
        self.parts.get(&index)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Finished calls in index order. Slots that never received a name are
    /// dropped, and calls without an id get a generated one.
    pub fn finalize(self) -> Vec<ToolCall> {
        self.parts
            .into_values()
            .filter(|part| !part.name.trim().is_empty())
            .map(|part| ToolCall {
                id: if part.id.is_empty() {
                    format!("call_{}", Uuid::new_v4())
                } else {
                    part.id
                },
                tool_type: "function".to_string(),
                function: FunctionCall {
                    name: part.name,
                    arguments: part.arguments,
                },
            })
            .collect()
    }
}
