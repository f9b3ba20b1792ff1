use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::config::{AppConfig, ProviderConfig};
use crate::error::ParseError;
use crate::providers::{AnthropicProvider, LlmProvider, OpenAIProvider, DEFAULT_ANTHROPIC_MODEL};

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Model used when a provider has no configured entry.
pub(crate) fn default_model(provider_name: &str) -> &'static str {
    match provider_name {
        "openai" => DEFAULT_OPENAI_MODEL,
        _ => DEFAULT_ANTHROPIC_MODEL,
    }
}

fn api_key_variable(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Arc<dyn LlmProvider>, ParseError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(ParseError::Builder(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "anthropic" => Ok(Arc::new(AnthropicProvider::new(config, timeout)?)),
            "openai" => Ok(Arc::new(OpenAIProvider::new(config, timeout)?)),
            _ => Err(ParseError::Builder(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Get the default provider from configuration.
    ///
    /// Without a configured entry, the default provider's own API key variable
    /// (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`) enables it with its default model.
    /// `ANTHROPIC_API_KEY` is tried last for any default.
    pub fn get_default_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, ParseError> {
        Self::default_provider_from_env(config, |name| std::env::var(name).ok())
    }

    fn default_provider_from_env(
        config: &AppConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Arc<dyn LlmProvider>, ParseError> {
        let provider_name = config.default_provider.as_str();
        let timeout = config.generative_timeout();

        if let Some(provider_config) = config.providers.get(provider_name) {
            info!("Using configured provider '{}'", provider_name);
            return Self::create(provider_name, provider_config, timeout);
        }

        let candidates = [provider_name, "anthropic"];
        for name in candidates {
            let Some(api_key) = api_key_variable(name).and_then(&env) else {
                continue;
            };
            debug!("No provider configured, using {} from environment", name);
            let provider_config = ProviderConfig {
                enabled: true,
                model: default_model(name).to_string(),
                temperature: 0.0,
                max_tokens: 2048,
                api_key: Some(api_key),
                base_url: None,
            };
            return Self::create(name, &provider_config, timeout);
        }

        Err(ParseError::NoGenerativeBackend)
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["anthropic", "openai"]
    }
}
