//! Token budget management for conversation logs.
//!
//! # Key Components
//!
//! - [`counter`]: Language-aware word-based token estimation
//! - [`types`]: `TokenBudget` ceiling configuration and enforcement reports
//! - [`enforcer`]: FIFO eviction that never removes the system message

pub mod counter;
pub mod enforcer;
pub mod types;

pub use counter::{language_from_locale, TokenCounter, WordTokenEstimator};
pub use enforcer::enforce_budget;
pub use types::{EnforcementReport, TokenBudget};
