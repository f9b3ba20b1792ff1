//! Tokenizer for ingredient quantity phrases.
//!
//! A phrase is `quantity unit [ingredient]`. The quantity grammar is tried in
//! this order: fraction glyph, range, mixed number, simple fraction, decimal.

use std::sync::LazyLock;

use regex::Regex;

use super::tables::{FRACTION_GLYPHS, MULTI_WORD_UNITS, TEXT_FRACTIONS};
use crate::model::{ParsedMeasurement, Quantity};

/// Phrases that describe an amount without measuring it.
const QUALITATIVE: &[&str] = &["to taste", "pinch", "dash", "handful", "some", "a few"];

static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*[-–]\s*(\d+(?:\.\d+)?)").expect("Invalid range regex")
});

static MIXED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\s+(\d+/\d+)|\s*([⅛¼⅓⅜½⅝⅔¾⅞]))").expect("Invalid mixed number regex")
});

static FRACTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)/(\d+)").expect("Invalid fraction regex"));

static DECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?").expect("Invalid decimal regex"));

static UNIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z.]*").expect("Invalid unit regex"));

/// Split a quantity phrase into quantity, unit and ingredient name.
///
/// Returns `None` for qualitative phrases ("salt to taste", "a pinch of salt")
/// and for anything that does not start with a quantity followed by a unit word.
pub fn parse(phrase: &str) -> Option<ParsedMeasurement> {
    let trimmed = phrase.trim();
    let lower = trimmed.to_lowercase();
    if QUALITATIVE.iter().any(|q| lower.contains(q)) {
        return None;
    }

    let (quantity, rest) = parse_quantity(trimmed)?;
    let (unit, rest) = parse_unit(rest.trim_start())?;

    let ingredient_name = rest
        .trim()
        .trim_start_matches(',')
        .trim()
        .to_string();

    Some(ParsedMeasurement {
        quantity,
        unit,
        ingredient_name,
    })
}

/// Match the leading quantity token, returning it with the unconsumed text.
pub fn parse_quantity(text: &str) -> Option<(Quantity, &str)> {
    if let Some(first) = text.chars().next() {
        if let Some(value) = FRACTION_GLYPHS.get(&first) {
            return Some((Quantity::Single(*value), &text[first.len_utf8()..]));
        }
    }

    if let Some(caps) = RANGE_REGEX.captures(text) {
        let min: f64 = caps[1].parse().ok()?;
        let max: f64 = caps[2].parse().ok()?;
        return Some((Quantity::range(min, max), &text[caps[0].len()..]));
    }

    if let Some(caps) = MIXED_REGEX.captures(text) {
        let whole: f64 = caps[1].parse().ok()?;
        let fraction = match (caps.get(2), caps.get(3)) {
            (Some(text_fraction), _) => fraction_value(text_fraction.as_str())?,
            (None, Some(glyph)) => glyph
                .as_str()
                .chars()
                .next()
                .and_then(|c| FRACTION_GLYPHS.get(&c).copied())?,
            (None, None) => return None,
        };
        return Some((Quantity::Single(whole + fraction), &text[caps[0].len()..]));
    }

    if let Some(caps) = FRACTION_REGEX.captures(text) {
        let value = fraction_value(&caps[0])?;
        return Some((Quantity::Single(value), &text[caps[0].len()..]));
    }

    let found = DECIMAL_REGEX.find(text)?;
    let value: f64 = found.as_str().parse().ok()?;
    Some((Quantity::Single(value), &text[found.end()..]))
}

/// Resolve "n/d" through the fraction table, falling back to plain division.
fn fraction_value(text: &str) -> Option<f64> {
    if let Some(value) = TEXT_FRACTIONS.get(text) {
        return Some(*value);
    }
    let (numerator, denominator) = text.split_once('/')?;
    let numerator: f64 = numerator.trim().parse().ok()?;
    let denominator: f64 = denominator.trim().parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

fn parse_unit(text: &str) -> Option<(String, &str)> {
    let lower = text.to_lowercase();
    for unit in MULTI_WORD_UNITS {
        if lower.starts_with(unit) && ends_token(&text[unit.len()..]) {
            return Some((unit.to_string(), &text[unit.len()..]));
        }
    }

    let found = UNIT_REGEX.find(text)?;
    let rest = &text[found.end()..];
    if !ends_token(rest) {
        return None;
    }
    let unit = found.as_str().trim_end_matches('.').to_lowercase();
    Some((unit, rest))
}

fn ends_token(rest: &str) -> bool {
    rest.chars().next().map_or(true, |c| !c.is_alphanumeric())
}
