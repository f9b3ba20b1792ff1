//! Lookup tables for measurement conversion.
//!
//! Volumes convert to millilitres and weights to grams. All keys are lower-case;
//! callers normalize units before lookup. Tables are built once and never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Multiplier from a customary unit to its metric base unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionFactor {
    pub factor: f64,
    pub unit: &'static str,
}

/// Fixed metric amount for a regional or packaged measurement term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionalEquivalent {
    pub key: &'static str,
    pub amount: f64,
    pub unit: &'static str,
    pub note: Option<&'static str>,
}

const fn ml(factor: f64) -> ConversionFactor {
    ConversionFactor { factor, unit: "ml" }
}

const fn g(factor: f64) -> ConversionFactor {
    ConversionFactor { factor, unit: "g" }
}

/// US volume units -> millilitres.
pub static VOLUME_CONVERSIONS: LazyLock<HashMap<&'static str, ConversionFactor>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Cups
        m.insert("cup", ml(250.0));
        m.insert("cups", ml(250.0));
        m.insert("c", ml(250.0));

        // Tablespoons
        m.insert("tablespoon", ml(15.0));
        m.insert("tablespoons", ml(15.0));
        m.insert("tbsp", ml(15.0));
        m.insert("tbs", ml(15.0));
        m.insert("tb", ml(15.0));

        // Teaspoons
        m.insert("teaspoon", ml(5.0));
        m.insert("teaspoons", ml(5.0));
        m.insert("tsp", ml(5.0));
        m.insert("t", ml(5.0));

        // Fluid ounces
        m.insert("fluid ounce", ml(30.0));
        m.insert("fluid ounces", ml(30.0));
        m.insert("fl oz", ml(30.0));
        m.insert("fl. oz", ml(30.0));
        m.insert("fl.oz", ml(30.0));

        m.insert("pint", ml(473.0));
        m.insert("pints", ml(473.0));
        m.insert("pt", ml(473.0));

        m.insert("quart", ml(946.0));
        m.insert("quarts", ml(946.0));
        m.insert("qt", ml(946.0));

        m.insert("gallon", ml(3785.0));
        m.insert("gallons", ml(3785.0));
        m.insert("gal", ml(3785.0));

        m
    });

/// US/Imperial weight units -> grams.
pub static WEIGHT_CONVERSIONS: LazyLock<HashMap<&'static str, ConversionFactor>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        m.insert("ounce", g(28.35));
        m.insert("ounces", g(28.35));
        m.insert("oz", g(28.35));

        m.insert("pound", g(453.6));
        m.insert("pounds", g(453.6));
        m.insert("lb", g(453.6));
        m.insert("lbs", g(453.6));

        m
    });

/// Units made of more than one word, longest first.
pub const MULTI_WORD_UNITS: &[&str] = &[
    "fluid ounces",
    "fluid ounce",
    "fl. oz",
    "fl.oz",
    "fl oz",
];

/// Units that are already metric and never converted.
pub const METRIC_UNITS: &[&str] = &[
    "g",
    "gram",
    "grams",
    "kg",
    "kilogram",
    "kilograms",
    "ml",
    "milliliter",
    "milliliters",
    "millilitre",
    "millilitres",
    "l",
    "liter",
    "liters",
    "litre",
    "litres",
];

/// Spoon and cup units that are acceptable as-is in the regional locale.
pub const COMMON_UNITS: &[&str] = &[
    "cup",
    "cups",
    "c",
    "teaspoon",
    "teaspoons",
    "tsp",
    "t",
    "tablespoon",
    "tablespoons",
    "tbsp",
    "tbs",
    "tb",
];

const fn regional(
    key: &'static str,
    amount: f64,
    note: Option<&'static str>,
) -> RegionalEquivalent {
    RegionalEquivalent {
        key,
        amount,
        unit: "g",
        note,
    }
}

/// NZ equivalents for regional terms. Order matters: the first match wins.
pub const REGIONAL_EQUIVALENTS: &[RegionalEquivalent] = &[
    // Butter
    regional("stick of butter", 125.0, Some("US stick")),
    regional("stick butter", 125.0, Some("US stick")),
    regional("1 stick of butter", 125.0, Some("US stick")),
    regional("1 stick butter", 125.0, Some("US stick")),
    // Canned goods (common sizes)
    regional("can (15 oz)", 425.0, None),
    regional("can (14.5 oz)", 410.0, None),
    regional("can (14 oz)", 400.0, None),
    regional("can (12 oz)", 340.0, None),
    regional("can (10.5 oz)", 300.0, None),
    regional("can (10 oz)", 280.0, None),
    regional("can (8 oz)", 225.0, None),
    regional("can (6 oz)", 170.0, None),
    // Packages
    regional("package cream cheese", 250.0, Some("Standard US package")),
    regional("package (8 oz) cream cheese", 225.0, None),
    // Eggs
    regional("large egg", 50.0, Some("Approximate")),
    regional("medium egg", 44.0, Some("Approximate")),
];

/// Unicode vulgar fraction glyphs.
pub static FRACTION_GLYPHS: LazyLock<HashMap<char, f64>> = LazyLock::new(|| {
    HashMap::from([
        ('⅛', 0.125),
        ('¼', 0.25),
        ('⅓', 0.333),
        ('⅜', 0.375),
        ('½', 0.5),
        ('⅝', 0.625),
        ('⅔', 0.667),
        ('¾', 0.75),
        ('⅞', 0.875),
    ])
});

/// Text fractions with the same rounding as their glyph forms.
pub static TEXT_FRACTIONS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    HashMap::from([
        ("1/8", 0.125),
        ("1/4", 0.25),
        ("1/3", 0.333),
        ("3/8", 0.375),
        ("1/2", 0.5),
        ("5/8", 0.625),
        ("2/3", 0.667),
        ("3/4", 0.75),
        ("7/8", 0.875),
    ])
});

/// Standard oven settings, Fahrenheit -> Celsius as printed on NZ ovens.
pub static COMMON_OVEN_TEMPERATURES: LazyLock<HashMap<i64, i64>> = LazyLock::new(|| {
    HashMap::from([
        (200, 95),
        (250, 120),
        (275, 135),
        (300, 150),
        (325, 165),
        (350, 175),
        (375, 190),
        (400, 200),
        (425, 220),
        (450, 230),
        (475, 245),
        (500, 260),
    ])
});

/// Look up a volume or weight factor for a normalized unit.
pub fn customary_factor(unit: &str) -> Option<ConversionFactor> {
    VOLUME_CONVERSIONS
        .get(unit)
        .or_else(|| WEIGHT_CONVERSIONS.get(unit))
        .copied()
}

pub fn is_metric_unit(unit: &str) -> bool {
    METRIC_UNITS.contains(&unit)
}

pub fn is_common_unit(unit: &str) -> bool {
    COMMON_UNITS.contains(&unit)
}
