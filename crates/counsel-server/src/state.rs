use std::io;
use std::sync::Arc;

use counsel_core::{ConversationStore, InMemoryConversationStore, ToolRegistry};
use counsel_llm::{create_provider, LLMProvider, ProviderConfig};
use counsel_loop::{Orchestrator, OrchestratorConfig};
use counsel_tools::{build_registry, ToolsConfig};

pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Wire an in-memory store, the configured provider and the configured
    /// tools into one orchestrator.
    pub fn from_config(
        provider: &ProviderConfig,
        tools: &ToolsConfig,
        orchestrator: OrchestratorConfig,
    ) -> io::Result<Self> {
        let llm = create_provider(provider).map_err(|error| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Failed to create LLM provider: {error}"),
            )
        })?;
        let registry = build_registry(tools).map_err(|error| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Failed to register tools: {error}"),
            )
        })?;

        Ok(Self::with_provider(llm, Arc::new(registry), orchestrator))
    }

    pub fn with_provider(
        llm: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());
        Self::new(Arc::new(Orchestrator::new(store, llm, tools, config)))
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        self.orchestrator.store()
    }
}
