pub mod agent;
pub mod budget;
pub mod store;
pub mod tools;

pub use agent::types::{serialize_log, Message, MessageContent, Role, Session};
pub use agent::TurnError;
pub use budget::{
    enforce_budget, language_from_locale, EnforcementReport, TokenBudget, TokenCounter,
    WordTokenEstimator,
};
pub use store::{
    ConversationStore, InMemoryConversationStore, SeedContext, SharedSession,
};
pub use tools::{
    execute_tool_call, parse_tool_args, RegistryError, Tool, ToolCall, ToolCallAccumulator,
    ToolCallDelta, ToolError, ToolRegistry, ToolSchema,
};
