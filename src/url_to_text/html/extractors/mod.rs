mod json_ld;

pub use json_ld::{format_duration, JsonLdExtractor};
