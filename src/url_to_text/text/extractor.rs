use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;

use crate::error::ParseError;
use crate::model::RawRecipe;
use crate::providers::{build_extraction_prompt, LlmProvider};
use crate::text::decode_entities;

/// Shape of the JSON object the generative backend is asked to return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerativeRecipe {
    title: Option<String>,
    description: Option<String>,
    servings: Option<String>,
    prep_time: Option<String>,
    cook_time: Option<String>,
    total_time: Option<String>,
    ingredients: Option<Vec<String>>,
    instructions: Option<Vec<String>>,
    notes: Option<Vec<String>>,
    image_url: Option<String>,
}

/// Extracts recipe fields from a page digest with a text-generation backend.
pub struct GenerativeExtractor {
    provider: Arc<dyn LlmProvider>,
}

impl GenerativeExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        GenerativeExtractor { provider }
    }

    pub async fn extract(&self, digest: &str, source: &str) -> Result<RawRecipe, ParseError> {
        info!(
            "Extracting recipe from {} with {}",
            source,
            self.provider.provider_name()
        );

        let prompt = build_extraction_prompt(digest);
        let answer = self.provider.complete(&prompt).await?;
        debug!("Generative answer of {} characters", answer.len());

        parse_answer(&answer)
    }
}

/// Parse and validate the backend's answer.
fn parse_answer(answer: &str) -> Result<RawRecipe, ParseError> {
    let json = extract_json_object(answer)
        .ok_or_else(|| ParseError::Generative("No JSON object in response".to_string()))?;

    let recipe: GenerativeRecipe = serde_json::from_str(json)
        .map_err(|e| ParseError::Generative(format!("Invalid JSON in response: {e}")))?;

    let title = decoded(recipe.title).filter(|title| !title.is_empty());
    let ingredients = decoded_list(recipe.ingredients);
    let instructions = decoded_list(recipe.instructions);

    let (Some(title), false, false) = (title, ingredients.is_empty(), instructions.is_empty())
    else {
        return Err(ParseError::Generative(
            "Missing required recipe fields in response".to_string(),
        ));
    };

    Ok(RawRecipe {
        title,
        description: decoded(recipe.description),
        servings: decoded(recipe.servings),
        prep_time: non_empty(recipe.prep_time),
        cook_time: non_empty(recipe.cook_time),
        total_time: non_empty(recipe.total_time),
        ingredients,
        instructions,
        notes: decoded_list(recipe.notes),
        image_url: non_empty(recipe.image_url),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn decoded(value: Option<String>) -> Option<String> {
    non_empty(value.map(|s| decode_entities(&s)))
}

fn decoded_list(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .iter()
        .map(|value| decode_entities(value).trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Locate the first balanced top-level `{...}` object in `text`.
///
/// Braces inside JSON strings (and escaped quotes) are ignored, so prose
/// around the object and braces in recipe text do not confuse the scan.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubProvider(String);

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, ParseError> {
            Ok(self.0.clone())
        }
    }

    fn extractor(answer: &str) -> GenerativeExtractor {
        GenerativeExtractor::new(Arc::new(StubProvider(answer.to_string())))
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
        assert_eq!(
            extract_json_object(r#"Here you go: {"a": {"b": 2}} Hope it helps {x}"#),
            Some(r#"{"a": {"b": 2}}"#)
        );
        assert_eq!(
            extract_json_object(r#"{"t": "use } and { and \" freely"} trailing"#),
            Some(r#"{"t": "use } and { and \" freely"}"#)
        );
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object(r#"{"unterminated": "#), None);
    }

    #[tokio::test]
    async fn test_extract_wrapped_answer() {
        let answer = r#"Sure! Here is the recipe:
```json
{
  "title": "Mac &amp; Cheese",
  "servings": "4 servings",
  "prepTime": "10 minutes",
  "ingredients": ["2 cups macaroni", "1 cup cheddar"],
  "instructions": ["Boil the pasta.", "Stir in the cheese."],
  "notes": ["Use sharp cheddar"]
}
```"#;
        let recipe = extractor(answer)
            .extract("digest", "https://example.com")
            .await
            .unwrap();

        assert_eq!(recipe.title, "Mac & Cheese");
        assert_eq!(recipe.servings.as_deref(), Some("4 servings"));
        assert_eq!(recipe.prep_time.as_deref(), Some("10 minutes"));
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.instructions[1], "Stir in the cheese.");
        assert_eq!(recipe.notes, vec!["Use sharp cheddar"]);
        assert_eq!(recipe.image_url, None);
    }

    #[tokio::test]
    async fn test_missing_required_fields_are_rejected() {
        let answers = [
            r#"{"ingredients": ["1 egg"], "instructions": ["Boil"]}"#,
            r#"{"title": "", "ingredients": ["1 egg"], "instructions": ["Boil"]}"#,
            r#"{"title": "Egg", "instructions": ["Boil"]}"#,
            r#"{"title": "Egg", "ingredients": [], "instructions": ["Boil"]}"#,
            r#"{"title": "Egg", "ingredients": ["1 egg"]}"#,
        ];

        for answer in answers {
            let err = extractor(answer)
                .extract("digest", "https://example.com")
                .await
                .unwrap_err();
            assert!(
                err.to_string().contains("Missing required recipe fields"),
                "accepted {answer}"
            );
        }
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_rejected() {
        for answer in ["I could not find a recipe.", r#"{"title": 42}"#] {
            let result = extractor(answer).extract("digest", "https://example.com").await;
            assert!(matches!(result, Err(ParseError::Generative(_))));
        }
    }
}
