use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::model::RawRecipe;
use crate::text::clean_text;

/// Nodes deeper than this are not searched.
const MAX_DEPTH: usize = 32;
/// Upper bound on nodes visited per block.
const MAX_NODES: usize = 10_000;

const UNTITLED: &str = "Untitled Recipe";

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?T(?:(\d+)H)?(?:(\d+)(?:-(\d+))?M)?(?:(\d+(?:\.\d+)?)S)?$")
        .expect("Invalid duration regex")
});

static TRAILING_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("Invalid trailing comma regex"));

/// Finds a schema.org Recipe in the page's JSON-LD blocks.
pub struct JsonLdExtractor;

impl JsonLdExtractor {
    /// Search every JSON-LD block in document order; the first usable Recipe wins.
    pub fn find_recipe(&self, document: &Html) -> Option<RawRecipe> {
        let selector =
            Selector::parse(r#"script[type="application/ld+json"]"#).expect("Invalid selector");

        let scripts: Vec<_> = document.select(&selector).collect();
        debug!("JsonLdExtractor: Found {} JSON-LD script tags", scripts.len());

        for (index, script) in scripts.iter().enumerate() {
            let raw_json = script.text().collect::<String>();
            let json_ld = match parse_block(&raw_json) {
                Ok(json_ld) => json_ld,
                Err(e) => {
                    warn!("JsonLdExtractor: Skipping block {}: {}", index, e);
                    continue;
                }
            };

            let mut search = RecipeSearch::default();
            if let Some(recipe) = search.visit(&json_ld, 0) {
                debug!(
                    "JsonLdExtractor: Recipe found in block {} after {} nodes",
                    index, search.visited
                );
                return Some(recipe);
            }
            debug!("JsonLdExtractor: No recipe in block {}", index);
        }

        None
    }
}

/// Parse a block, retrying once after repairing common publishing mistakes.
fn parse_block(raw_json: &str) -> Result<Value, ParseError> {
    match serde_json::from_str::<Value>(raw_json) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            debug!("JsonLdExtractor: Invalid JSON ({}), trying repair", first_error);
            serde_json::from_str::<Value>(&repair_json(raw_json))
                .map_err(|_| ParseError::StructuredParse(first_error.to_string()))
        }
    }
}

/// Escape raw control characters inside strings and drop trailing commas.
fn repair_json(json_str: &str) -> String {
    let mut repaired = String::with_capacity(json_str.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json_str.chars() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    repaired.push(c);
                }
                '\\' => {
                    escaped = true;
                    repaired.push(c);
                }
                '"' => {
                    in_string = false;
                    repaired.push(c);
                }
                '\n' | '\r' | '\t' => repaired.push(' '),
                _ => repaired.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            repaired.push(c);
        }
    }

    TRAILING_COMMA_REGEX.replace_all(&repaired, "$1").into_owned()
}

/// Depth-first search for a Recipe node, bounded in depth and node count.
#[derive(Default)]
struct RecipeSearch {
    visited: usize,
}

impl RecipeSearch {
    fn visit(&mut self, value: &Value, depth: usize) -> Option<RawRecipe> {
        if depth > MAX_DEPTH || self.visited >= MAX_NODES {
            return None;
        }
        self.visited += 1;

        match value {
            Value::Object(obj) => {
                if is_recipe_type(value) {
                    match map_recipe(value) {
                        Some(recipe) => return Some(recipe),
                        None => {
                            debug!("JsonLdExtractor: Recipe node without ingredients or instructions");
                            return None;
                        }
                    }
                }

                if let Some(graph) = obj.get("@graph") {
                    if let Some(recipe) = self.visit(graph, depth + 1) {
                        return Some(recipe);
                    }
                }

                obj.iter()
                    .filter(|(key, _)| key.as_str() != "@graph")
                    .find_map(|(_, child)| self.visit(child, depth + 1))
            }
            Value::Array(items) => items.iter().find_map(|item| self.visit(item, depth + 1)),
            _ => None,
        }
    }
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(type_str)) => is_recipe_name(type_str),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(is_recipe_name),
        _ => false,
    }
}

/// Accepts "Recipe", "recipe", "schema:Recipe" and "https://schema.org/Recipe".
fn is_recipe_name(type_str: &str) -> bool {
    type_str
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .is_some_and(|name| name.trim().eq_ignore_ascii_case("recipe"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonLdRecipe {
    name: Option<Value>,
    description: Option<Value>,
    image: Option<Value>,
    #[serde(rename = "recipeIngredient")]
    recipe_ingredient: Option<Value>,
    ingredients: Option<Value>,
    #[serde(rename = "recipeInstructions")]
    recipe_instructions: Option<Value>,
    #[serde(rename = "recipeYield")]
    recipe_yield: Option<Value>,
    #[serde(rename = "prepTime")]
    prep_time: Option<Value>,
    #[serde(rename = "cookTime")]
    cook_time: Option<Value>,
    #[serde(rename = "totalTime")]
    total_time: Option<Value>,
}

/// Map a Recipe node to a raw recipe; `None` if it lacks ingredients or instructions.
fn map_recipe(node: &Value) -> Option<RawRecipe> {
    let recipe = match JsonLdRecipe::deserialize(node) {
        Ok(recipe) => recipe,
        Err(e) => {
            debug!("JsonLdExtractor: Failed to read Recipe node: {}", e);
            return None;
        }
    };

    // Older markup uses "ingredients"; some pages carry both keys.
    let ingredients = [&recipe.recipe_ingredient, &recipe.ingredients]
        .into_iter()
        .flatten()
        .map(parse_ingredients)
        .find(|list| !list.is_empty())
        .unwrap_or_default();

    let mut instructions = Vec::new();
    if let Some(value) = &recipe.recipe_instructions {
        flatten_instructions(value, &mut instructions, 0);
    }

    if ingredients.is_empty() || instructions.is_empty() {
        return None;
    }

    let title = recipe
        .name
        .as_ref()
        .and_then(text_value)
        .unwrap_or_else(|| UNTITLED.to_string());

    Some(RawRecipe {
        title,
        description: recipe.description.as_ref().and_then(text_value),
        servings: recipe.recipe_yield.as_ref().and_then(parse_servings),
        prep_time: recipe.prep_time.as_ref().and_then(parse_time),
        cook_time: recipe.cook_time.as_ref().and_then(parse_time),
        total_time: recipe.total_time.as_ref().and_then(parse_time),
        ingredients,
        instructions,
        notes: Vec::new(),
        image_url: recipe.image.as_ref().and_then(parse_image),
    })
}

/// A non-empty cleaned string from a string or `{text}` value.
fn text_value(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("text").and_then(Value::as_str)?,
        _ => return None,
    };
    let cleaned = clean_text(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn parse_ingredients(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(clean_text(s)),
                Value::Object(obj) => {
                    let name = obj.get("name").and_then(Value::as_str)?;
                    let amount = obj.get("amount").and_then(Value::as_str).unwrap_or("");
                    Some(clean_text(&format!("{amount} {name}")))
                }
                _ => None,
            })
            .filter(|ingredient| !ingredient.is_empty())
            .collect(),
        Value::String(s) => s
            .lines()
            .map(clean_text)
            .filter(|ingredient| !ingredient.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Flatten strings, steps and (nested) sections into ordered step texts.
fn flatten_instructions(value: &Value, steps: &mut Vec<String>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }

    match value {
        Value::String(s) => steps.extend(
            s.lines()
                .map(clean_text)
                .filter(|step| !step.is_empty()),
        ),
        Value::Array(items) => {
            for item in items {
                flatten_instructions(item, steps, depth + 1);
            }
        }
        Value::Object(obj) => {
            if let Some(children) = obj.get("itemListElement").or_else(|| obj.get("steps")) {
                flatten_instructions(children, steps, depth + 1);
            } else if let Some(text) = ["text", "name"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str))
            {
                let cleaned = clean_text(text);
                if !cleaned.is_empty() {
                    steps.push(cleaned);
                }
            }
        }
        _ => {}
    }
}

fn parse_image(value: &Value) -> Option<String> {
    let url = match value {
        Value::String(s) => s.as_str(),
        Value::Array(items) => match items.first()? {
            Value::String(s) => s.as_str(),
            Value::Object(obj) => obj.get("url").and_then(Value::as_str)?,
            _ => return None,
        },
        Value::Object(obj) => obj.get("url").and_then(Value::as_str)?,
        _ => return None,
    };
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

fn parse_servings(value: &Value) -> Option<String> {
    let first = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let servings = match first {
        Value::String(s) => clean_text(s),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!servings.is_empty()).then_some(servings)
}

fn parse_time(value: &Value) -> Option<String> {
    let raw = value.as_str()?.trim();
    (!raw.is_empty()).then(|| format_duration(raw))
}

/// Convert an ISO 8601 duration to a human-readable string.
///
/// `PT1H30M` and `PT90M` both become "1 hour 30 minutes"; minute ranges
/// (`PT15-20M`) and seconds (`PT5400S`) are handled. Anything else is returned as-is.
pub fn format_duration(duration: &str) -> String {
    let Some(caps) = DURATION_REGEX.captures(duration) else {
        return duration.to_string();
    };
    // Present components that do not fit a u64 leave the duration as written.
    let number = |i: usize| caps.get(i).map(|m| m.as_str().parse::<u64>().ok());
    let (Some(days), Some(hours), Some(minutes), Some(high)) = (
        number(1).unwrap_or(Some(0)),
        number(2).unwrap_or(Some(0)),
        number(3).map_or(Some(None), |m| m.map(Some)),
        number(4).map_or(Some(None), |m| m.map(Some)),
    ) else {
        return duration.to_string();
    };
    let seconds = caps
        .get(5)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);
    if seconds / 60.0 >= u64::MAX as f64 {
        return duration.to_string();
    }

    if caps.get(2).is_none() && minutes.is_none() && caps.get(5).is_none() {
        return duration.to_string();
    }

    // A minute range keeps its own wording after the hours.
    if let (Some(low), Some(high)) = (minutes, high) {
        let Some(hours) = days.checked_mul(24).and_then(|h| h.checked_add(hours)) else {
            return duration.to_string();
        };
        let range = format!("{low}-{high} minutes");
        return if hours > 0 {
            format!("{} {range}", plural(hours, "hour"))
        } else {
            range
        };
    }

    let total_minutes = days
        .checked_mul(24 * 60)
        .and_then(|m| m.checked_add(hours.checked_mul(60)?))
        .and_then(|m| m.checked_add(minutes.unwrap_or(0)))
        .and_then(|m| m.checked_add((seconds / 60.0).round() as u64));
    let Some(total_minutes) = total_minutes else {
        return duration.to_string();
    };
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);

    match (hours, minutes) {
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} {}", plural(h, "hour"), plural(m, "minute")),
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
