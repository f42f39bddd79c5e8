//! HTTP front end for the counsel assistant.

pub mod handlers;
pub mod logging;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;

pub use server::{app_config, run_server, spawn_idle_sweeper, ServerConfig};
pub use state::AppState;
