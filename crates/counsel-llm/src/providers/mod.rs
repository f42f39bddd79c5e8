//! LLM Providers
//!
//! OpenAI-compatible chat completions and Google Gemini.

pub(crate) mod common;
pub mod gemini;
pub mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
