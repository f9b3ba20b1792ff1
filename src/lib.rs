//! Extract recipes from web pages and normalize their ingredient measurements.
//!
//! Pages are tried against embedded schema.org JSON-LD first. Pages without
//! usable structured data are reduced to a text digest and handed to a
//! generative backend. Every recipe, however obtained, has its ingredient
//! quantities converted to metric and its oven temperatures to Celsius.

pub mod builder;
pub mod config;
pub mod error;
pub mod measurements;
pub mod model;
pub mod pipelines;
pub mod providers;
pub mod text;
pub mod url_to_text;
pub mod validation;

pub use builder::{Provider, RecipeParser, RecipeParserBuilder};
pub use config::AppConfig;
pub use error::ParseError;
pub use model::{
    ExtractionOutcome, Ingredient, Measurement, ParseMethod, ParseResponse, ParsedRecipe,
};
pub use providers::LlmProvider;
pub use tokio_util::sync::CancellationToken;

/// Parse the recipe at `url` with configuration from `config.toml` and the environment.
///
/// Never fails: every problem, including an invalid URL, is reported in the response.
pub async fn parse_recipe(url: &str) -> ParseResponse {
    parse_recipe_with_cancel(url, &CancellationToken::new()).await
}

/// Like [`parse_recipe`], aborting the pending fetch or generative call once `cancel` fires.
pub async fn parse_recipe_with_cancel(url: &str, cancel: &CancellationToken) -> ParseResponse {
    match RecipeParser::builder().build() {
        Ok(parser) => parser.parse_response(url, cancel).await,
        Err(e) => ParseResponse::failed(&e),
    }
}
