use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Amount of an ingredient as written in a recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    Single(f64),
    /// An interval such as "2-3"; always `min <= max`.
    Range { min: f64, max: f64 },
}

impl Quantity {
    /// Build a range, ordering the endpoints.
    pub fn range(a: f64, b: f64) -> Self {
        if a <= b {
            Quantity::Range { min: a, max: b }
        } else {
            Quantity::Range { min: b, max: a }
        }
    }

    pub fn as_single(&self) -> Option<f64> {
        match self {
            Quantity::Single(value) => Some(*value),
            Quantity::Range { .. } => None,
        }
    }
}

/// A quantity phrase split into its parts, e.g. "1 1/2 cups flour".
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMeasurement {
    pub quantity: Quantity,
    /// Lower-cased and trimmed
    pub unit: String,
    pub ingredient_name: String,
}

/// An ingredient measurement in its original and normalized forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub original: String,
    pub normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional_equivalent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub raw: String,
    pub measurement: Measurement,
    pub name: String,
}

/// A recipe as returned to callers, with measurements normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Recipe fields as found by an extractor, before measurement conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecipe {
    pub title: String,
    pub description: Option<String>,
    pub servings: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub total_time: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub notes: Vec<String>,
    pub image_url: Option<String>,
}

/// How a recipe was (or was not) obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMethod {
    Structured,
    Generative,
    Failed,
}

/// Result of running the extraction pipeline once.
#[derive(Debug)]
pub enum ExtractionOutcome {
    StructuredSuccess(ParsedRecipe),
    GenerativeSuccess(ParsedRecipe),
    Failure(ParseError),
}

impl ExtractionOutcome {
    pub fn method(&self) -> ParseMethod {
        match self {
            ExtractionOutcome::StructuredSuccess(_) => ParseMethod::Structured,
            ExtractionOutcome::GenerativeSuccess(_) => ParseMethod::Generative,
            ExtractionOutcome::Failure(_) => ParseMethod::Failed,
        }
    }

    pub fn recipe(&self) -> Option<&ParsedRecipe> {
        match self {
            ExtractionOutcome::StructuredSuccess(recipe)
            | ExtractionOutcome::GenerativeSuccess(recipe) => Some(recipe),
            ExtractionOutcome::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ExtractionOutcome::Failure(_))
    }
}

/// Serializable answer of the pipeline entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<ParsedRecipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub method: ParseMethod,
}

impl ParseResponse {
    pub fn failed(error: &ParseError) -> Self {
        ParseResponse {
            success: false,
            recipe: None,
            error: Some(error.to_string()),
            method: ParseMethod::Failed,
        }
    }
}

impl From<ExtractionOutcome> for ParseResponse {
    fn from(outcome: ExtractionOutcome) -> Self {
        let method = outcome.method();
        match outcome {
            ExtractionOutcome::StructuredSuccess(recipe)
            | ExtractionOutcome::GenerativeSuccess(recipe) => ParseResponse {
                success: true,
                recipe: Some(recipe),
                error: None,
                method,
            },
            ExtractionOutcome::Failure(error) => ParseResponse::failed(&error),
        }
    }
}
