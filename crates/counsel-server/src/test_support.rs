use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use futures::stream;

use counsel_core::{Message, ToolRegistry, ToolSchema};
use counsel_llm::{LLMChunk, LLMError, LLMProvider, LLMStream};
use counsel_loop::OrchestratorConfig;

use crate::state::AppState;

/// Replays one scripted stream per request. Scripts must end in
/// `LLMChunk::Done` to count as a finished round; once they run out every
/// request gets an empty, unfinished stream.
pub struct ScriptedProvider {
    rounds: Mutex<VecDeque<Vec<Result<LLMChunk, LLMError>>>>,
    requests: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(rounds: Vec<Vec<Result<LLMChunk, LLMError>>>) -> Arc<Self> {
        Arc::new(Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(0),
        })
    }

    pub fn silent() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn request_count(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat_stream(
        &self,
        _messages: &[Message],
        _tools: &[ToolSchema],
        _max_output_tokens: Option<u32>,
    ) -> counsel_llm::provider::Result<LLMStream> {
        *self.requests.lock().unwrap() += 1;
        let round = self.rounds.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::pin(stream::iter(round)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn test_state(provider: Arc<ScriptedProvider>) -> web::Data<AppState> {
    web::Data::new(AppState::with_provider(
        provider,
        Arc::new(ToolRegistry::new()),
        OrchestratorConfig::default(),
    ))
}
