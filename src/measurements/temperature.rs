use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::tables::COMMON_OVEN_TEMPERATURES;

/// Fahrenheit temperatures such as "350°F", "350 F" or "350 degrees Fahrenheit".
static FAHRENHEIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(?:°|degrees?\b)?\s*F(?:ahrenheit)?\b")
        .expect("Invalid temperature regex")
});

pub fn fahrenheit_to_celsius(fahrenheit: i64) -> i64 {
    ((fahrenheit - 32) as f64 * 5.0 / 9.0).round() as i64
}

/// Celsius for an oven setting, preferring the standard dial values.
pub fn oven_celsius(fahrenheit: i64) -> i64 {
    COMMON_OVEN_TEMPERATURES
        .get(&fahrenheit)
        .copied()
        .unwrap_or_else(|| fahrenheit_to_celsius(fahrenheit))
}

/// Replace every Fahrenheit temperature in `text` with its Celsius value.
pub fn convert_temperatures(text: &str) -> String {
    FAHRENHEIT_REGEX
        .replace_all(text, |caps: &Captures| match caps[1].parse::<i64>() {
            Ok(fahrenheit) => format!("{}°C", oven_celsius(fahrenheit)),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}
