//! Provider Factory
//!
//! Creates LLM providers based on configuration.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::provider::{LLMError, LLMProvider};
use crate::providers::{GeminiProvider, OpenAIProvider};

/// Available provider types
pub const AVAILABLE_PROVIDERS: &[&str] = &["openai", "gemini"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Gemini,
}

impl FromStr for ProviderKind {
    type Err = LLMError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(LLMError::Protocol(format!(
                "Unknown provider '{}'. Available: {}",
                other,
                AVAILABLE_PROVIDERS.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Create a provider from configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LLMProvider>, LLMError> {
    if config.api_key.trim().is_empty() {
        return Err(LLMError::Auth(format!(
            "{:?} API key is required",
            config.kind
        )));
    }

    let base_url = config.base_url.as_deref().filter(|url| !url.is_empty());
    let model = config.model.as_deref().filter(|model| !model.is_empty());

    let provider: Arc<dyn LLMProvider> = match config.kind {
        ProviderKind::OpenAI => {
            let mut provider = OpenAIProvider::new(&config.api_key);
            if let Some(base_url) = base_url {
                provider = provider.with_base_url(base_url);
            }
            if let Some(model) = model {
                provider = provider.with_model(model);
            }
            Arc::new(provider)
        }
        ProviderKind::Gemini => {
            let mut provider = GeminiProvider::new(&config.api_key);
            if let Some(base_url) = base_url {
                provider = provider.with_base_url(base_url);
            }
            if let Some(model) = model {
                provider = provider.with_model(model);
            }
            Arc::new(provider)
        }
    };

    log::info!(
        "Using {} provider{}",
        provider.name(),
        model.map(|m| format!(" with model {m}")).unwrap_or_default()
    );

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: ProviderKind, api_key: &str) -> ProviderConfig {
        ProviderConfig {
            kind,
            api_key: api_key.to_string(),
            base_url: None,
            model: None,
        }
    }

    #[test]
    fn parses_provider_kind_case_insensitively() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!(" gemini ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn creates_requested_provider() {
        let openai = create_provider(&config(ProviderKind::OpenAI, "sk-test")).unwrap();
        assert_eq!(openai.name(), "openai");

        let gemini = create_provider(&config(ProviderKind::Gemini, "g-test")).unwrap();
        assert_eq!(gemini.name(), "gemini");
    }

    #[test]
    fn missing_api_key_is_auth_error() {
        let result = create_provider(&config(ProviderKind::OpenAI, "  "));
        assert!(matches!(result, Err(LLMError::Auth(_))));
    }
}
