use std::fmt;

use serde_json::{json, Value};

use counsel_core::{
    enforce_budget, execute_tool_call, Message, Session, ToolCall, ToolRegistry, ToolSchema,
    TokenCounter, TurnError,
};
use counsel_llm::LLMProvider;

use crate::config::OrchestratorConfig;
use crate::stream::handler::{stream_completion, StreamHandlingOutput};
use crate::timer::Timer;

pub type Result<T> = std::result::Result<T, TurnError>;

/// Where a turn currently is. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingModel,
    ToolRequested,
    ToolDispatching,
    Done,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::AwaitingModel => "awaiting_model",
            TurnState::ToolRequested => "tool_requested",
            TurnState::ToolDispatching => "tool_dispatching",
            TurnState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything a turn needs besides the session it mutates.
pub struct TurnContext<'a> {
    pub llm: &'a dyn LLMProvider,
    pub tools: &'a ToolRegistry,
    pub counter: &'a dyn TokenCounter,
    pub config: &'a OrchestratorConfig,
}

/// Hidden user turn that restates a tool result so every provider treats it
/// as authoritative. The call is restated as `{"name", "arguments"}` JSON.
pub fn tool_result_prompt(user_input: &str, tool_call: &ToolCall, result: &Value) -> String {
    let call = json!({
        "name": tool_call.function.name.trim(),
        "arguments": tool_call.function.arguments,
    });

    format!(
        "As the user input was: {user_input}\n\
And the tool called was: {call}\n\
Here is the tool response: {result}\n\
Now provide the final answer to the user, considering the tool's result, \
without revealing that a tool was used."
    )
}

/// Run one user turn to completion against `session`.
///
/// Appends the user message, then alternates completion rounds and tool
/// dispatch until a round requests no tools. Returns that round's text.
pub async fn run_turn<F>(
    session: &mut Session,
    user_input: &str,
    ctx: &TurnContext<'_>,
    on_fragment: &mut F,
) -> Result<String>
where
    F: FnMut(&str) + Send,
{
    let session_id = session.id.clone();
    let ceiling = ctx.config.budget.ceiling();
    let tool_schemas = ctx.tools.list_tools();

    session.add_message(Message::user(user_input));
    enforce(session, ceiling, ctx.counter);

    for round in 1..=ctx.config.max_rounds {
        log::info!(
            "[{}] Round {}/{}: {}",
            session_id,
            round,
            ctx.config.max_rounds,
            TurnState::AwaitingModel
        );

        let output = run_round(session, &tool_schemas, ctx, on_fragment, round).await?;

        if output.tool_calls.is_empty() {
            session.add_message(Message::assistant(output.content.clone()));
            log::info!(
                "[{}] {} after {} round(s), {} fragments in final answer",
                session_id,
                TurnState::Done,
                round,
                output.fragment_count
            );
            return Ok(output.content);
        }

        log::info!(
            "[{}] {}: {} call(s)",
            session_id,
            TurnState::ToolRequested,
            output.tool_calls.len()
        );

        let mut answered = Vec::new();
        for tool_call in output.tool_calls {
            if let Some(result) = dispatch_tool_call(&session_id, &tool_call, ctx).await {
                answered.push((tool_call, result));
            }
        }

        // The round records only the calls whose results follow it.
        let calls = answered.iter().map(|(call, _)| call.clone()).collect();
        session.add_message(Message::assistant_with_tool_calls(output.content, calls));

        for (tool_call, result) in answered {
            let prompt = tool_result_prompt(user_input, &tool_call, &result);
            let name = tool_call.function.name.trim().to_string();
            session.add_message(Message::function_result(name, result));
            session.add_message(Message::hidden_user(prompt));
            enforce(session, ceiling, ctx.counter);
        }
    }

    log::error!(
        "[{}] Model still requesting tools after {} rounds",
        session_id,
        ctx.config.max_rounds
    );
    Err(TurnError::TooManyToolRounds {
        max_rounds: ctx.config.max_rounds,
    })
}

async fn run_round<F>(
    session: &Session,
    tool_schemas: &[ToolSchema],
    ctx: &TurnContext<'_>,
    on_fragment: &mut F,
    round: usize,
) -> Result<StreamHandlingOutput>
where
    F: FnMut(&str) + Send,
{
    let timer = Timer::start(&session.id, format!("round {round}"));

    let completion = stream_completion(
        ctx.llm,
        &session.messages,
        tool_schemas,
        ctx.config.max_output_tokens,
        on_fragment,
        &session.id,
    );

    let output = match ctx.config.round_timeout {
        Some(limit) => match tokio::time::timeout(limit, completion).await {
            Ok(result) => result?,
            Err(_) => {
                log::error!(
                    "[{}] Round {} timed out after {}s",
                    session.id,
                    round,
                    limit.as_secs()
                );
                return Err(TurnError::Timeout {
                    seconds: limit.as_secs(),
                });
            }
        },
        None => completion.await?,
    };

    timer.log_elapsed();
    Ok(output)
}

/// Dispatch one call. Failures are logged and the call is skipped.
async fn dispatch_tool_call(
    session_id: &str,
    tool_call: &ToolCall,
    ctx: &TurnContext<'_>,
) -> Option<Value> {
    let name = tool_call.function.name.trim();

    log::info!(
        "[{}] {}: {} ({})",
        session_id,
        TurnState::ToolDispatching,
        name,
        tool_call.id
    );
    log::debug!(
        "[{}] Tool arguments for {}: {}",
        session_id,
        name,
        tool_call.function.arguments
    );

    let timer = Timer::start(session_id, format!("tool {name}"));
    let result = execute_tool_call(tool_call, ctx.tools).await;
    timer.log_elapsed();

    match result {
        Ok(value) => Some(value),
        Err(error) => {
            log::warn!(
                "[{}] Skipping tool call {} ({}): {}",
                session_id,
                name,
                tool_call.id,
                error
            );
            None
        }
    }
}

fn enforce(session: &mut Session, ceiling: u32, counter: &dyn TokenCounter) {
    let report = enforce_budget(&mut session.messages, ceiling, counter);

    if report.evicted > 0 {
        log::info!(
            "[{}] Evicted {} message(s), estimate now {}/{} tokens",
            session.id,
            report.evicted,
            report.estimated_tokens,
            report.ceiling
        );
    }

    if report.over_budget {
        log::warn!(
            "[{}] System message alone exceeds budget ({} > {}), proceeding",
            session.id,
            report.estimated_tokens,
            report.ceiling
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::tools::FunctionCall;

    #[test]
    fn tool_result_prompt_restates_input_call_and_result() {
        let call = ToolCall {
            id: "call_1".to_string(),
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: " generateMartindaleURL ".to_string(),
                arguments: r#"{"term":"divorce"}"#.to_string(),
            },
        };

        let prompt = tool_result_prompt("find me a lawyer", &call, &json!({"url": "u"}));

        assert!(prompt.contains("As the user input was: find me a lawyer"));
        let restated = prompt
            .lines()
            .find_map(|line| line.strip_prefix("And the tool called was: "))
            .expect("restated call");
        let restated: Value = serde_json::from_str(restated).unwrap();
        assert_eq!(
            restated,
            json!({"name": "generateMartindaleURL", "arguments": r#"{"term":"divorce"}"#})
        );
        assert!(prompt.contains(r#"Here is the tool response: {"url":"u"}"#));
        assert!(prompt.ends_with("without revealing that a tool was used."));
    }

    #[test]
    fn turn_state_display_names() {
        assert_eq!(TurnState::AwaitingModel.to_string(), "awaiting_model");
        assert_eq!(TurnState::Done.to_string(), "done");
    }
}
