use std::time::Duration;

use counsel_core::TokenBudget;

pub const DEFAULT_MAX_ROUNDS: usize = 8;
pub const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Completion rounds allowed per turn before giving up.
    pub max_rounds: usize,
    pub budget: TokenBudget,
    /// Bound on one provider round (request plus stream); `None` disables it.
    pub round_timeout: Option<Duration>,
    pub max_output_tokens: Option<u32>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            budget: TokenBudget::default(),
            round_timeout: Some(DEFAULT_ROUND_TIMEOUT),
            max_output_tokens: None,
        }
    }
}
