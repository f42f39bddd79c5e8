use serde_json::Value;
use thiserror::Error;

use crate::tools::validation::validate_arguments;
use crate::tools::{ToolCall, ToolRegistry};

#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// Parse the reassembled argument text. Empty text means "no arguments".
pub fn parse_tool_args(arguments: &str) -> Result<Value> {
    let args_raw = arguments.trim();

    if args_raw.is_empty() {
        return Ok(serde_json::json!({}));
    }

    serde_json::from_str(args_raw)
        .map_err(|error| ToolError::InvalidArguments(format!("Invalid JSON arguments: {error}")))
}

/// Resolve, parse, validate and run one finished tool call.
pub async fn execute_tool_call(tool_call: &ToolCall, registry: &ToolRegistry) -> Result<Value> {
    let name = tool_call.function.name.trim();
    let tool = registry
        .get(name)
        .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

    let args = parse_tool_args(&tool_call.function.arguments)?;
    validate_arguments(&tool.parameters_schema(), &args).map_err(ToolError::InvalidArguments)?;

    tool.execute(args).await
}
