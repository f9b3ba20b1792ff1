use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::error::ParseError;
use crate::providers::{build_client, LlmProvider};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ParseError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or(ParseError::NoGenerativeBackend)?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(AnthropicProvider {
            client: build_client(timeout)?,
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.0,
            max_tokens: 2048,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ParseError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ]
            }))
            .send()
            .await
            .map_err(|e| ParseError::Generative(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParseError::Generative(format!(
                "Anthropic API returned status {}",
                status.as_u16()
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| ParseError::Generative(e.to_string()))?;
        debug!("{:?}", response_body);

        let block = &response_body["content"][0];
        if block["type"].as_str() != Some("text") {
            return Err(ParseError::Generative(
                "Unexpected response type from Anthropic API".to_string(),
            ));
        }

        block["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                ParseError::Generative("Failed to extract content from Anthropic response".to_string())
            })
    }
}
