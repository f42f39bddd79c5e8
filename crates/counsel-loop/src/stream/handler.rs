use futures::StreamExt;

use counsel_core::{Message, ToolCall, ToolCallAccumulator, ToolSchema, TurnError};
use counsel_llm::{LLMChunk, LLMProvider, LLMStream};

pub struct StreamHandlingOutput {
    pub content: String,
    pub fragment_count: usize,
    pub tool_calls: Vec<ToolCall>,
}

/// Drain one provider stream, forwarding every text fragment to `on_fragment`
/// as it arrives. Tool-call deltas are only reassembled here; their arguments
/// are not parsed until the stream has ended.
///
/// On a stream error, fragments already forwarded stay forwarded. A stream
/// that ends without [`LLMChunk::Done`] was cut off and is a provider error,
/// so a truncated round is never committed or dispatched.
pub async fn consume_llm_stream<F>(
    mut stream: LLMStream,
    on_fragment: &mut F,
    session_id: &str,
) -> Result<StreamHandlingOutput, TurnError>
where
    F: FnMut(&str) + Send,
{
    let mut content = String::new();
    let mut fragment_count = 0usize;
    let mut tool_calls = ToolCallAccumulator::new();
    let mut finished = false;

    while let Some(chunk_result) = stream.next().await {
        match chunk_result {
            Ok(LLMChunk::Token(token)) => {
                if token.is_empty() {
                    continue;
                }
                fragment_count += 1;
                content.push_str(&token);
                on_fragment(&token);
            }
            Ok(LLMChunk::ToolCallDeltas(deltas)) => {
                log::debug!(
                    "[{}] Received {} tool call deltas",
                    session_id,
                    deltas.len()
                );
                tool_calls.extend(deltas);
            }
            Ok(LLMChunk::Done) => {
                log::debug!("[{}] LLM stream completed", session_id);
                finished = true;
            }
            Err(error) => {
                log::error!("[{}] Stream error: {}", session_id, error);
                return Err(TurnError::Provider(error.to_string()));
            }
        }
    }

    if !finished {
        log::error!(
            "[{}] Stream ended without a completion signal after {} fragments",
            session_id,
            fragment_count
        );
        return Err(TurnError::Provider(
            "stream ended before the provider signalled completion".to_string(),
        ));
    }

    Ok(StreamHandlingOutput {
        content,
        fragment_count,
        tool_calls: tool_calls.finalize(),
    })
}

/// Open one completion request and consume it to the end.
pub async fn stream_completion<F>(
    llm: &dyn LLMProvider,
    messages: &[Message],
    tools: &[ToolSchema],
    max_output_tokens: Option<u32>,
    on_fragment: &mut F,
    session_id: &str,
) -> Result<StreamHandlingOutput, TurnError>
where
    F: FnMut(&str) + Send,
{
    let stream = llm
        .chat_stream(messages, tools, max_output_tokens)
        .await
        .map_err(|error| {
            log::error!("[{}] Failed to open {} stream: {}", session_id, llm.name(), error);
            TurnError::Provider(error.to_string())
        })?;

    consume_llm_stream(stream, on_fragment, session_id).await
}
