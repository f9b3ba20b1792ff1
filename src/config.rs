use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Generative provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Page fetch and content reduction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Generative request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            extraction: ExtractionConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for a specific generative provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "claude-3-haiku-20240307", "gpt-4o-mini")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Configuration for fetching pages and reducing them to a digest
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Page fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
    /// Digests shorter than this are not sent to the generative backend
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
    /// User agent sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: default_fetch_timeout(),
            min_content_length: default_min_content_length(),
            user_agent: default_user_agent(),
        }
    }
}

impl ExtractionConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

// Default value functions
fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout() -> u64 {
    60
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_min_content_length() -> usize {
    100
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; RecipeParser/1.0)".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE__PROVIDERS__ANTHROPIC__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Generative request timeout
    pub fn generative_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the source priority.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE__EXTRACTION__FETCH_TIMEOUT
        .add_source(
            Environment::with_prefix("RECIPE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
