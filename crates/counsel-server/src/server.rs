use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tokio::task::JoinHandle;

use counsel_core::ConversationStore;
use counsel_llm::ProviderConfig;
use counsel_loop::OrchestratorConfig;
use counsel_tools::ToolsConfig;

use crate::handlers;
use crate::state::AppState;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Idle sessions are looked for at least this often.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
    pub orchestrator: OrchestratorConfig,
    pub session_ttl: Duration,
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/chat", web::post().to(handlers::chat::handler))
            .route(
                "/history/{session_id}",
                web::get().to(handlers::history::handler),
            )
            .route(
                "/sessions/{session_id}",
                web::delete().to(handlers::delete::handler),
            )
            .route("/health", web::get().to(handlers::health::handler)),
    );
}

fn sweep_interval(ttl: Duration) -> Duration {
    (ttl / 2).clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL)
}

/// Periodically drop sessions that have been idle longer than `ttl`.
pub fn spawn_idle_sweeper(store: Arc<dyn ConversationStore>, ttl: Duration) -> JoinHandle<()> {
    let period = sweep_interval(ttl);
    log::info!(
        "Session sweeper running every {}s (ttl {}s)",
        period.as_secs(),
        ttl.as_secs()
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            if !evicted.is_empty() {
                log::info!(
                    "Evicted {} idle session(s), {} remaining",
                    evicted.len(),
                    store.len()
                );
            }
        }
    })
}

pub async fn run_server(config: ServerConfig) -> io::Result<()> {
    log::info!(
        "Initializing server with provider {:?}, max {} tool rounds, budget ceiling {} tokens",
        config.provider.kind,
        config.orchestrator.max_rounds,
        config.orchestrator.budget.ceiling()
    );

    let state = web::Data::new(AppState::from_config(
        &config.provider,
        &config.tools,
        config.orchestrator.clone(),
    )?);

    let sweeper = spawn_idle_sweeper(state.store().clone(), config.session_ttl);

    log::info!("Listening on 0.0.0.0:{}", config.port);
    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind(format!("0.0.0.0:{}", config.port))?
    .run()
    .await;

    sweeper.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_interval_is_bounded() {
        assert_eq!(sweep_interval(DEFAULT_SESSION_TTL), MAX_SWEEP_INTERVAL);
        assert_eq!(sweep_interval(Duration::from_secs(10)), Duration::from_secs(5));
        assert_eq!(sweep_interval(Duration::from_millis(100)), Duration::from_secs(1));
    }
}
