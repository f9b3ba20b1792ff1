mod anthropic;
mod factory;
mod open_ai;
mod prompt;

pub use anthropic::{AnthropicProvider, DEFAULT_MODEL as DEFAULT_ANTHROPIC_MODEL};
pub(crate) use factory::default_model;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_extraction_prompt, RECIPE_EXTRACTION_PROMPT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::ParseError;

/// A text-generation backend used for generative recipe extraction.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Send a single-turn prompt and return the text of the answer.
    async fn complete(&self, prompt: &str) -> Result<String, ParseError>;
}

/// HTTP client for generative requests, bounded by `timeout`.
fn build_client(timeout: Duration) -> Result<Client, ParseError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ParseError::Builder(format!("Failed to build HTTP client: {e}")))
}
