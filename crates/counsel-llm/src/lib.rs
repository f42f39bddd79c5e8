pub mod provider;
pub mod provider_factory;
pub mod providers;
pub mod types;

pub use provider::{LLMError, LLMProvider, LLMStream};
pub use provider_factory::{create_provider, ProviderConfig, ProviderKind, AVAILABLE_PROVIDERS};
pub use providers::{GeminiProvider, OpenAIProvider};
pub use types::LLMChunk;
