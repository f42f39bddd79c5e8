//! Streaming, tool-augmented conversation turns.
//!
//! [`Orchestrator::stream_turn`] is the entry point: it resolves the session,
//! serializes access to it for the whole turn, and drives
//! [`runner::run_turn`] against the configured provider and tool registry.

pub mod config;
pub mod runner;
pub mod stream;
pub mod timer;

use std::sync::Arc;

use counsel_core::{
    ConversationStore, SeedContext, ToolRegistry, TurnError, WordTokenEstimator,
};
use counsel_llm::LLMProvider;

pub use config::OrchestratorConfig;
pub use runner::{run_turn, tool_result_prompt, TurnContext, TurnState};
pub use stream::{consume_llm_stream, stream_completion, StreamHandlingOutput};
pub use timer::Timer;

pub struct Orchestrator {
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        llm: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            llm,
            tools,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Process one user message for `session_id`, forwarding answer text to
    /// `on_fragment` as it streams in. Resolves to the final round's text.
    ///
    /// Empty ids or input are rejected before the session is touched. Two
    /// calls for the same session run one after the other.
    pub async fn stream_turn<F>(
        &self,
        session_id: &str,
        user_input: &str,
        seed: &SeedContext,
        mut on_fragment: F,
    ) -> Result<String, TurnError>
    where
        F: FnMut(&str) + Send,
    {
        if session_id.trim().is_empty() {
            return Err(TurnError::InvalidInput("sessionId is required".to_string()));
        }
        if user_input.trim().is_empty() {
            return Err(TurnError::InvalidInput("userInput is required".to_string()));
        }

        let shared = self.store.get_or_create(session_id, seed).await;
        let mut session = shared.lock().await;

        let counter = WordTokenEstimator::for_language(session.language.as_deref());
        let ctx = TurnContext {
            llm: self.llm.as_ref(),
            tools: self.tools.as_ref(),
            counter: &counter,
            config: &self.config,
        };

        let timer = Timer::start(session_id, "turn");
        let result = run_turn(&mut session, user_input, &ctx, &mut on_fragment).await;
        timer.log_elapsed();

        if let Err(error) = &result {
            log::error!("[{}] Turn failed: {}", session_id, error);
        }

        result
    }
}
