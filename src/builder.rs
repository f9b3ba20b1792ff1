use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, ProviderConfig};
use crate::error::ParseError;
use crate::model::{ExtractionOutcome, ParseResponse};
use crate::pipelines::url::UrlPipeline;
use crate::providers::{default_model, LlmProvider, ProviderFactory};
use crate::url_to_text::fetchers::RequestFetcher;
use crate::url_to_text::text::GenerativeExtractor;
use crate::validation::validate_url;

/// Generative backends that can be selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    /// Convert to provider name string used by the factory
    fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
        }
    }
}

/// Builder for configuring a [`RecipeParser`]
#[derive(Default)]
pub struct RecipeParserBuilder {
    config: Option<AppConfig>,
    provider: Option<Provider>,
    llm_provider: Option<Arc<dyn LlmProvider>>,
    timeout: Option<Duration>,
    fetch_timeout: Option<Duration>,
    min_content_length: Option<usize>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl RecipeParserBuilder {
    /// Use this configuration instead of loading `config.toml` and `RECIPE__*` variables
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Select the generative backend
    ///
    /// # Example
    /// ```
    /// use recipe_parser::{Provider, RecipeParser};
    ///
    /// let builder = RecipeParser::builder()
    ///     .provider(Provider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use a ready-made generative backend, bypassing provider configuration
    pub fn llm_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.llm_provider = Some(provider);
        self
    }

    /// Set a timeout for generative requests
    ///
    /// # Example
    /// ```
    /// use recipe_parser::RecipeParser;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeParser::builder()
    ///     .timeout(Duration::from_secs(30));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set a timeout for fetching the recipe page
    pub fn fetch_timeout(mut self, duration: Duration) -> Self {
        self.fetch_timeout = Some(duration);
        self
    }

    /// Digests shorter than this many characters fail without a generative call
    pub fn min_content_length(mut self, length: usize) -> Self {
        self.min_content_length = Some(length);
        self
    }

    /// Set the API key for the generative backend
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the generative backend
    ///
    /// # Example
    /// ```
    /// use recipe_parser::{Provider, RecipeParser};
    ///
    /// let builder = RecipeParser::builder()
    ///     .provider(Provider::Anthropic)
    ///     .model("claude-3-5-haiku-20241022");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Point the generative backend at a custom or proxy endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build the parser
    ///
    /// # Errors
    /// Returns `ParseError` if:
    /// - The HTTP client cannot be created
    /// - An explicitly requested provider is unknown, disabled or has no API key
    ///
    /// A missing default backend is not an error: the parser then only
    /// succeeds on pages with structured recipe data.
    pub fn build(self) -> Result<RecipeParser, ParseError> {
        let config = match self.config {
            Some(config) => config,
            None => AppConfig::load().unwrap_or_else(|e| {
                warn!("Failed to load configuration, using defaults: {}", e);
                AppConfig::default()
            }),
        };

        let generative_timeout = self.timeout.unwrap_or_else(|| config.generative_timeout());
        let fetch_timeout = self
            .fetch_timeout
            .unwrap_or_else(|| config.extraction.fetch_timeout());
        let min_content_length = self
            .min_content_length
            .unwrap_or(config.extraction.min_content_length);

        let explicit = self.provider.is_some()
            || self.api_key.is_some()
            || self.model.is_some()
            || self.base_url.is_some();

        let provider = if let Some(provider) = self.llm_provider {
            Some(provider)
        } else if explicit {
            let name = match self.provider {
                Some(provider) => provider.as_str(),
                None => config.default_provider.as_str(),
            };
            let mut provider_config =
                config
                    .providers
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| ProviderConfig {
                        enabled: true,
                        model: default_model(name).to_string(),
                        temperature: 0.0,
                        max_tokens: 2048,
                        api_key: None,
                        base_url: None,
                    });
            if let Some(api_key) = self.api_key {
                provider_config.api_key = Some(api_key);
            }
            if let Some(model) = self.model {
                provider_config.model = model;
            }
            if let Some(base_url) = self.base_url {
                provider_config.base_url = Some(base_url);
            }
            Some(ProviderFactory::create(name, &provider_config, generative_timeout)?)
        } else {
            match ProviderFactory::get_default_provider(&config) {
                Ok(provider) => Some(provider),
                Err(ParseError::NoGenerativeBackend) => {
                    info!("No generative backend configured, structured data only");
                    None
                }
                Err(e) => return Err(e),
            }
        };

        let fetcher = RequestFetcher::new(Some(fetch_timeout), &config.extraction.user_agent)?;
        let generative = provider.map(GenerativeExtractor::new);

        Ok(RecipeParser {
            pipeline: UrlPipeline::new(fetcher, generative, min_content_length, generative_timeout),
        })
    }
}

/// Extracts recipes from web pages.
///
/// # Example
/// ```no_run
/// # use recipe_parser::RecipeParser;
/// # use tokio_util::sync::CancellationToken;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let parser = RecipeParser::builder().build()?;
/// let outcome = parser
///     .parse("https://example.com/recipe", &CancellationToken::new())
///     .await;
/// println!("{:?}", outcome.method());
/// # Ok(())
/// # }
/// ```
pub struct RecipeParser {
    pipeline: UrlPipeline,
}

impl RecipeParser {
    /// Creates a new builder
    pub fn builder() -> RecipeParserBuilder {
        RecipeParserBuilder::default()
    }

    /// Run the extraction chain for `url`.
    pub async fn parse(&self, url: &str, cancel: &CancellationToken) -> ExtractionOutcome {
        self.pipeline.process(url, cancel).await
    }

    /// Validate `url`, run the extraction chain and shape the answer for callers.
    pub async fn parse_response(&self, url: &str, cancel: &CancellationToken) -> ParseResponse {
        // The recipe keeps the address as sent, not the normalized form
        match validate_url(url) {
            Ok(_) => self.parse(url.trim(), cancel).await.into(),
            Err(e) => ParseResponse::failed(&e),
        }
    }
}
