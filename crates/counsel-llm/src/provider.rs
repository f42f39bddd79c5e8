use crate::types::LLMChunk;
use async_trait::async_trait;
use counsel_core::{Message, ToolSchema};
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Protocol conversion error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// A finite, non-restartable sequence of decoded provider events.
pub type LLMStream = Pin<Box<dyn Stream<Item = Result<LLMChunk>> + Send>>;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Open one streaming completion over the full message log.
    ///
    /// # Arguments
    /// * `messages` - Complete conversation log, system message first
    /// * `tools` - Tool descriptions the model may request
    /// * `max_output_tokens` - Maximum output tokens
    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        max_output_tokens: Option<u32>,
    ) -> Result<LLMStream>;

    /// Provider name used in logs.
    fn name(&self) -> &str;
}
