//! Text clean-up shared by both extraction paths.

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;

use crate::measurements::parser;

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

static LEADING_MEASUREMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+[\s\-/\d]*[a-zA-Z.\s]*?\s+").expect("Invalid leading measurement regex")
});

static LEADING_ARTICLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:of|a|an|the)\s+").expect("Invalid article regex"));

/// Decode HTML entities, including double-encoded ones such as `&amp;frac12;`.
pub fn decode_entities(text: &str) -> String {
    decode_html_entities(&decode_html_entities(text))
        .replace('\u{a0}', " ")
}

/// Collapse all runs of whitespace into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove markup that some sites leave inside structured-data strings.
pub fn strip_tags(text: &str) -> String {
    HTML_TAG_REGEX.replace_all(text, " ").into_owned()
}

/// Decode entities, drop stray tags and tidy whitespace.
pub fn clean_text(text: &str) -> String {
    normalize_whitespace(&strip_tags(&decode_entities(text)))
}

/// Best guess at the ingredient itself, e.g. "1 cup flour" -> "flour".
pub fn extract_ingredient_name(ingredient: &str) -> String {
    let name = match parser::parse(ingredient) {
        Some(parsed) if !parsed.ingredient_name.is_empty() => parsed.ingredient_name,
        _ => LEADING_MEASUREMENT_REGEX
            .replace(ingredient, "")
            .into_owned(),
    };

    let cleaned = LEADING_ARTICLE_REGEX.replace(name.trim(), "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        ingredient.trim().to_string()
    } else {
        cleaned.to_string()
    }
}
