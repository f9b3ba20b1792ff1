pub mod extractors;
pub mod reducer;

pub use extractors::JsonLdExtractor;
pub use reducer::{estimate_tokens, ContentReducer};
