pub mod url;

pub use url::{postprocess, UrlPipeline};
