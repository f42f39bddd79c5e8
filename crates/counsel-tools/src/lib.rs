//! Built-in tools for the counsel assistant.
//!
//! Each tool implements `counsel_core::Tool`; `build_registry` assembles the
//! ones that are configured into a `ToolRegistry`.

mod builtin;
pub mod tools;

pub use builtin::{build_registry, BuiltinTool, ToolsConfig, BUILTIN_TOOL_NAMES};
pub use tools::{AnalyzeContractTool, MartindaleUrlTool, WebSearchTool};
