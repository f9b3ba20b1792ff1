pub mod extractor;

pub use extractor::GenerativeExtractor;
