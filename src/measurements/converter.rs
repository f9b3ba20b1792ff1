use log::debug;

use super::parser;
use super::tables::{
    customary_factor, is_common_unit, is_metric_unit, RegionalEquivalent, REGIONAL_EQUIVALENTS,
};
use crate::model::{Measurement, ParsedMeasurement, Quantity};

/// Which units are acceptable without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitPolicy {
    /// Only metric units are kept; cups and spoons are converted to millilitres.
    #[default]
    Metric,
    /// Metric units plus cups and spoons are kept, as is usual in NZ recipes.
    Regional,
}

/// Result of converting one parsed measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// No rule applies; the original text stands.
    PassThrough,
    Converted(String),
}

impl Conversion {
    /// The converted text, or `original` when nothing was converted.
    pub fn into_text(self, original: &str) -> String {
        match self {
            Conversion::PassThrough => original.to_string(),
            Conversion::Converted(text) => text,
        }
    }
}

/// Convert a parsed measurement under the given unit policy.
///
/// Rules are checked in order: metric units, kept common units (regional policy
/// only), regional equivalents, volume/weight tables. Anything else passes through.
pub fn convert(parsed: &ParsedMeasurement, policy: UnitPolicy) -> Conversion {
    let unit = parsed.unit.as_str();

    if is_metric_unit(unit) {
        return Conversion::PassThrough;
    }

    if policy == UnitPolicy::Regional && is_common_unit(unit) {
        return Conversion::PassThrough;
    }

    if let Some(quantity) = parsed.quantity.as_single() {
        if let Some(entry) = find_regional_equivalent(parsed, quantity) {
            debug!("Regional equivalent '{}' for unit '{}'", entry.key, unit);
            let amount = format_amount(entry.amount * quantity);
            return Conversion::Converted(render(&amount, entry.unit, &parsed.ingredient_name));
        }
    }

    let Some(conversion) = customary_factor(unit) else {
        return Conversion::PassThrough;
    };

    let text = match parsed.quantity {
        Quantity::Single(quantity) => {
            let (amount, unit) = rescale(conversion.factor * quantity, conversion.unit);
            render(&format_amount(amount), unit, &parsed.ingredient_name)
        }
        Quantity::Range { min, max } => {
            let range = format!(
                "{}-{}",
                format_amount(conversion.factor * min),
                format_amount(conversion.factor * max)
            );
            render(&range, conversion.unit, &parsed.ingredient_name)
        }
    };
    Conversion::Converted(text)
}

/// Parse and convert one ingredient line.
///
/// `normalized` uses the metric policy and `regional_equivalent` the regional one.
/// Phrases that cannot be parsed are carried through verbatim.
pub fn normalize_ingredient(original: &str) -> Measurement {
    let Some(parsed) = parser::parse(original) else {
        return Measurement {
            original: original.to_string(),
            normalized: original.to_string(),
            regional_equivalent: None,
        };
    };

    let normalized = convert(&parsed, UnitPolicy::Metric).into_text(original);
    let regional = convert(&parsed, UnitPolicy::Regional).into_text(original);

    Measurement {
        original: original.to_string(),
        normalized,
        regional_equivalent: Some(regional),
    }
}

/// Format an amount for display: integers as-is, otherwise one decimal place
/// with a trailing `.0` dropped.
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

fn rescale(amount: f64, unit: &'static str) -> (f64, &'static str) {
    match unit {
        "ml" if amount >= 1000.0 => (amount / 1000.0, "L"),
        "g" if amount >= 1000.0 => (amount / 1000.0, "kg"),
        _ => (amount, unit),
    }
}

fn render(amount: &str, unit: &str, ingredient: &str) -> String {
    if ingredient.is_empty() {
        format!("{amount}{unit}")
    } else {
        format!("{amount}{unit} {ingredient}")
    }
}

/// Best-effort lookup of a regional term. A phrase matches an entry when it
/// contains the entry key, or failing that when the key starts with the unit word.
fn find_regional_equivalent(
    parsed: &ParsedMeasurement,
    quantity: f64,
) -> Option<&'static RegionalEquivalent> {
    let unit = parsed.unit.as_str();
    let singular = unit.strip_suffix('s').filter(|s| !s.is_empty()).unwrap_or(unit);
    let prefix = if quantity == 1.0 { "1 " } else { "" };

    let phrases: Vec<String> = [unit, singular]
        .iter()
        .map(|u| {
            format!("{prefix}{u} {}", parsed.ingredient_name)
                .trim()
                .to_lowercase()
        })
        .collect();

    REGIONAL_EQUIVALENTS
        .iter()
        .find(|entry| phrases.iter().any(|phrase| phrase.contains(entry.key)))
        .or_else(|| {
            REGIONAL_EQUIVALENTS.iter().find(|entry| {
                entry
                    .key
                    .split_whitespace()
                    .next()
                    .is_some_and(|word| word == unit || word == singular)
            })
        })
}
