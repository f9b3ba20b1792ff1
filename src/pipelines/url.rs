use std::time::Duration;

use log::{debug, info, warn};
use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::error::ParseError;
use crate::measurements::{convert_temperatures, normalize_ingredient};
use crate::model::{ExtractionOutcome, Ingredient, ParsedRecipe, RawRecipe};
use crate::text::extract_ingredient_name;
use crate::url_to_text::fetchers::RequestFetcher;
use crate::url_to_text::html::{estimate_tokens, ContentReducer, JsonLdExtractor};
use crate::url_to_text::text::GenerativeExtractor;

/// What a fetched page yields before any generative step.
enum PageContent {
    Structured(RawRecipe),
    Digest(String),
}

/// The fetch → structured data → digest → generative fallback chain.
pub struct UrlPipeline {
    fetcher: RequestFetcher,
    generative: Option<GenerativeExtractor>,
    min_content_length: usize,
    generative_timeout: Duration,
}

impl UrlPipeline {
    pub fn new(
        fetcher: RequestFetcher,
        generative: Option<GenerativeExtractor>,
        min_content_length: usize,
        generative_timeout: Duration,
    ) -> Self {
        UrlPipeline {
            fetcher,
            generative,
            min_content_length,
            generative_timeout,
        }
    }

    /// Process a URL into exactly one outcome.
    ///
    /// Steps run strictly in order and none is retried:
    /// 1. Fetch the page; any failure ends the attempt
    /// 2. Structured data (JSON-LD) wins whenever a usable Recipe is found
    /// 3. Otherwise the page is reduced to a digest; a digest shorter than
    ///    the minimum content length fails without a generative call
    /// 4. The digest is sent to the generative backend and its answer validated
    ///
    /// Cancelling `cancel` aborts a pending fetch or generative call.
    pub async fn process(&self, url: &str, cancel: &CancellationToken) -> ExtractionOutcome {
        match self.run(url, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Recipe extraction failed for {}: {}", url, e);
                ExtractionOutcome::Failure(e)
            }
        }
    }

    async fn run(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome, ParseError> {
        if cancel.is_cancelled() {
            return Err(ParseError::Cancelled);
        }

        info!("Fetching {}", url);
        let html = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ParseError::Cancelled),
            result = self.fetcher.fetch(url) => result?,
        };
        info!("Fetched {} bytes", html.len());

        let digest = match analyze_page(&html) {
            PageContent::Structured(raw) => {
                info!("Found structured recipe data: {}", raw.title);
                return Ok(ExtractionOutcome::StructuredSuccess(postprocess(raw, url)));
            }
            PageContent::Digest(digest) => digest,
        };

        let length = digest.chars().count();
        if length < self.min_content_length {
            return Err(ParseError::InsufficientContent {
                length,
                minimum: self.min_content_length,
            });
        }

        let generative = self
            .generative
            .as_ref()
            .ok_or(ParseError::NoGenerativeBackend)?;
        info!(
            "No structured data, sending digest of {} characters (~{} tokens) to generative backend",
            length,
            estimate_tokens(&digest)
        );

        let extraction = tokio::time::timeout(self.generative_timeout, generative.extract(&digest, url));
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ParseError::Cancelled),
            result = extraction => result.map_err(|_| {
                ParseError::Generative(format!("No response within {:?}", self.generative_timeout))
            })??,
        };

        info!("Generative extraction succeeded: {}", raw.title);
        Ok(ExtractionOutcome::GenerativeSuccess(postprocess(raw, url)))
    }
}

/// Parse the page once: a structured recipe if present, else a digest.
fn analyze_page(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    match JsonLdExtractor.find_recipe(&document) {
        Some(raw) => PageContent::Structured(raw),
        None => {
            debug!("No usable JSON-LD recipe, reducing page content");
            PageContent::Digest(ContentReducer.reduce(&document))
        }
    }
}

/// Normalize measurements and temperatures shared by both extraction paths.
pub fn postprocess(raw: RawRecipe, url: &str) -> ParsedRecipe {
    let ingredients = raw
        .ingredients
        .into_iter()
        .map(|line| Ingredient {
            measurement: normalize_ingredient(&line),
            name: extract_ingredient_name(&line),
            raw: line,
        })
        .collect();

    let instructions = raw
        .instructions
        .iter()
        .map(|step| convert_temperatures(step))
        .collect();

    ParsedRecipe {
        url: url.to_string(),
        title: raw.title,
        description: raw.description,
        servings: raw.servings,
        prep_time: raw.prep_time,
        cook_time: raw.cook_time,
        total_time: raw.total_time,
        ingredients,
        instructions,
        notes: (!raw.notes.is_empty()).then_some(raw.notes),
        image_url: raw.image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_page_prefers_structured_data() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
            {"@type": "Recipe", "name": "Test", "recipeIngredient": ["1 cup flour"],
             "recipeInstructions": ["Bake at 350°F"]}
            </script>
            </head><body><article><h1>Something else</h1></article></body></html>
        "#;
        match analyze_page(html) {
            PageContent::Structured(raw) => assert_eq!(raw.title, "Test"),
            PageContent::Digest(_) => panic!("expected structured data"),
        }
    }

    #[test]
    fn test_analyze_page_falls_back_to_digest() {
        let html = "<html><body><main><p>Just a short note.</p></main></body></html>";
        match analyze_page(html) {
            PageContent::Digest(digest) => assert_eq!(digest, "Just a short note."),
            PageContent::Structured(_) => panic!("expected a digest"),
        }
    }

    #[test]
    fn test_postprocess() {
        let raw = RawRecipe {
            title: "Test".to_string(),
            ingredients: vec!["1 cup flour".to_string(), "salt to taste".to_string()],
            instructions: vec!["Bake at 350°F for 20 minutes".to_string()],
            ..Default::default()
        };
        let recipe = postprocess(raw, "https://example.com/test");

        assert_eq!(recipe.url, "https://example.com/test");
        assert_eq!(recipe.ingredients[0].raw, "1 cup flour");
        assert_eq!(recipe.ingredients[0].measurement.normalized, "250ml flour");
        assert_eq!(recipe.ingredients[0].name, "flour");
        assert_eq!(recipe.ingredients[1].measurement.normalized, "salt to taste");
        assert_eq!(recipe.instructions, vec!["Bake at 175°C for 20 minutes"]);
        assert_eq!(recipe.notes, None);
    }
}
