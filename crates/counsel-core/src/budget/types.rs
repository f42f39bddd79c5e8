//! Core types for token budget management.

use serde::{Deserialize, Serialize};

/// Default context window (gpt-4o-mini class models).
pub const DEFAULT_MAX_CONTEXT_TOKENS: u32 = 128_000;
/// Share of the context window the conversation log may occupy.
pub const DEFAULT_CEILING_RATIO: f64 = 0.85;

/// Token budget configuration for a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBudget {
    /// Maximum context window size for the model
    pub max_context_tokens: u32,
    /// Fraction of the window usable by the log; the rest is headroom for
    /// estimation error and the model's answer
    pub ceiling_ratio: f64,
}

impl TokenBudget {
    pub fn new(max_context_tokens: u32, ceiling_ratio: f64) -> Self {
        Self {
            max_context_tokens,
            ceiling_ratio,
        }
    }

    pub fn for_model(max_context_tokens: u32) -> Self {
        Self::new(max_context_tokens, DEFAULT_CEILING_RATIO)
    }

    /// Maximum estimated tokens a log may hold before eviction.
    pub fn ceiling(&self) -> u32 {
        (self.max_context_tokens as f64 * self.ceiling_ratio).floor() as u32
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::for_model(DEFAULT_MAX_CONTEXT_TOKENS)
    }
}

/// Outcome of one budget enforcement pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementReport {
    /// Messages removed during this pass
    pub evicted: usize,
    /// Estimated size of the log after the pass
    pub estimated_tokens: u32,
    pub ceiling: u32,
    /// Only the system message is left and it alone exceeds the ceiling
    pub over_budget: bool,
}
