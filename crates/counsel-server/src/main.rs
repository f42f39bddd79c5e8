use std::io;
use std::time::Duration;

use clap::Parser;

use counsel_core::budget::types::{DEFAULT_CEILING_RATIO, DEFAULT_MAX_CONTEXT_TOKENS};
use counsel_core::TokenBudget;
use counsel_llm::{ProviderConfig, ProviderKind};
use counsel_loop::config::{DEFAULT_MAX_ROUNDS, DEFAULT_ROUND_TIMEOUT};
use counsel_loop::OrchestratorConfig;
use counsel_server::logging::init_logging;
use counsel_server::server::{DEFAULT_PORT, DEFAULT_SESSION_TTL};
use counsel_server::{run_server, ServerConfig};
use counsel_tools::ToolsConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "counsel-server")]
#[command(about = "Streaming legal-assistant chat server")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// LLM provider (openai or gemini)
    #[arg(long, env = "LLM_PROVIDER", default_value = "openai")]
    provider: ProviderKind,

    /// LLM API base URL (provider default when unset)
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,

    /// LLM model name (provider default when unset)
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// LLM API key
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model context window in tokens
    #[arg(long, env = "CONTEXT_TOKEN_LIMIT", default_value_t = DEFAULT_MAX_CONTEXT_TOKENS)]
    context_token_limit: u32,

    /// Maximum completion rounds per user turn
    #[arg(long, env = "MAX_TOOL_ROUNDS", default_value_t = DEFAULT_MAX_ROUNDS)]
    max_tool_rounds: usize,

    /// Per-round provider timeout in seconds, 0 disables
    #[arg(long, env = "ROUND_TIMEOUT_SECS", default_value_t = DEFAULT_ROUND_TIMEOUT.as_secs())]
    round_timeout_secs: u64,

    /// Idle session lifetime in seconds
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL.as_secs())]
    session_ttl_secs: u64,

    /// Web search API key; webSearch is disabled without it
    #[arg(long, env = "SEARCH_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,

    /// Web search API base URL
    #[arg(long, env = "SEARCH_BASE_URL")]
    search_base_url: Option<String>,

    /// Contract analyzer endpoint; analyzeContract is disabled without it
    #[arg(long, env = "ANALYZER_URL")]
    analyzer_url: Option<String>,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let round_timeout =
            (self.round_timeout_secs > 0).then(|| Duration::from_secs(self.round_timeout_secs));

        ServerConfig {
            port: self.port,
            provider: ProviderConfig {
                kind: self.provider,
                api_key: self.api_key,
                base_url: self.llm_base_url,
                model: self.model,
            },
            tools: ToolsConfig {
                search_api_key: self.search_api_key,
                search_base_url: self.search_base_url,
                analyzer_url: self.analyzer_url,
            },
            orchestrator: OrchestratorConfig {
                max_rounds: self.max_tool_rounds.max(1),
                budget: TokenBudget::new(self.context_token_limit, DEFAULT_CEILING_RATIO),
                round_timeout,
                max_output_tokens: None,
            },
            session_ttl: Duration::from_secs(self.session_ttl_secs.max(1)),
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        env_logger::Builder::new().parse_filters(level).init();
    } else {
        init_logging(cli.debug);
    }

    log::info!("Starting counsel server on port {}", cli.port);
    log::info!("LLM Configuration:");
    log::info!("  Provider: {:?}", cli.provider);
    log::info!(
        "  Base URL: {}",
        cli.llm_base_url.as_deref().unwrap_or("(provider default)")
    );
    log::info!("  Model: {}", cli.model.as_deref().unwrap_or("(provider default)"));

    if cli.debug {
        log::debug!("Debug mode enabled");
        log::debug!("  Context window: {} tokens", cli.context_token_limit);
        log::debug!("  Max tool rounds: {}", cli.max_tool_rounds);
        log::debug!("  Round timeout: {}s", cli.round_timeout_secs);
        log::debug!("  Session TTL: {}s", cli.session_ttl_secs);
    }

    run_server(cli.into_config()).await
}
