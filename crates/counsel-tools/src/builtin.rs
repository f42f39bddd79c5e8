use std::sync::Arc;

use serde::{Deserialize, Serialize};

use counsel_core::tools::SharedTool;
use counsel_core::{RegistryError, ToolRegistry};

use crate::tools::{AnalyzeContractTool, MartindaleUrlTool, WebSearchTool};

/// Every tool this crate knows how to build.
pub const BUILTIN_TOOL_NAMES: [&str; 3] = ["generateMartindaleURL", "webSearch", "analyzeContract"];

/// Credentials and endpoints for the tools that talk to other services.
/// A tool whose settings are missing is left out of the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsConfig {
    #[serde(default)]
    pub search_api_key: Option<String>,
    #[serde(default)]
    pub search_base_url: Option<String>,
    #[serde(default)]
    pub analyzer_url: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTool {
    MartindaleUrl,
    WebSearch,
    AnalyzeContract,
}

impl BuiltinTool {
    pub const ALL: [BuiltinTool; 3] = [
        BuiltinTool::MartindaleUrl,
        BuiltinTool::WebSearch,
        BuiltinTool::AnalyzeContract,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinTool::MartindaleUrl => BUILTIN_TOOL_NAMES[0],
            BuiltinTool::WebSearch => BUILTIN_TOOL_NAMES[1],
            BuiltinTool::AnalyzeContract => BUILTIN_TOOL_NAMES[2],
        }
    }

    /// Instantiate the tool, or `None` when `config` lacks what it needs.
    pub fn build(self, config: &ToolsConfig) -> Option<SharedTool> {
        match self {
            BuiltinTool::MartindaleUrl => Some(Arc::new(MartindaleUrlTool::new())),
            BuiltinTool::WebSearch => {
                let api_key = non_blank(&config.search_api_key)?;
                let mut tool = WebSearchTool::new(api_key);
                if let Some(base_url) = non_blank(&config.search_base_url) {
                    tool = tool.with_base_url(base_url);
                }
                Some(Arc::new(tool))
            }
            BuiltinTool::AnalyzeContract => {
                let endpoint = non_blank(&config.analyzer_url)?;
                Some(Arc::new(AnalyzeContractTool::new(endpoint)))
            }
        }
    }
}

/// Build the registry offered to the model.
pub fn build_registry(config: &ToolsConfig) -> Result<ToolRegistry, RegistryError> {
    let registry = ToolRegistry::new();

    for builtin in BuiltinTool::ALL {
        match builtin.build(config) {
            Some(tool) => registry.register_shared(tool)?,
            None => log::info!("{} is not configured, leaving it disabled", builtin.name()),
        }
    }

    log::info!(
        "Registered {} tool(s): {}",
        registry.len(),
        registry.list_tool_names().join(", ")
    );

    Ok(registry)
}
