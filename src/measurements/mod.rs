//! Ingredient measurement parsing and metric conversion.

pub mod converter;
pub mod parser;
pub mod tables;
pub mod temperature;

pub use converter::{convert, format_amount, normalize_ingredient, Conversion, UnitPolicy};
pub use parser::parse;
pub use temperature::convert_temperatures;
