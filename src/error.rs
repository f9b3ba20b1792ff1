use thiserror::Error;

/// Errors that can occur while extracting a recipe from a web page
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input was not a usable http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network or timeout failure while fetching the page
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The page responded with a non-success status
    #[error("Failed to fetch URL: HTTP error! status: {0}")]
    HttpStatus(u16),

    /// The page responded with something other than HTML
    #[error("Failed to fetch URL: URL does not return HTML content ({0})")]
    NotHtml(String),

    /// The reduced page text is too short to be worth a generative call
    #[error(
        "Could not extract meaningful content from the page ({length} of {minimum} characters). \
         The page may require JavaScript or may not contain a recipe."
    )]
    InsufficientContent { length: usize, minimum: usize },

    /// A structured-data block could not be parsed (logged, never surfaced as a failure)
    #[error("Malformed structured data: {0}")]
    StructuredParse(String),

    /// The generative backend failed or returned an unusable answer
    #[error("Failed to parse recipe with generative backend: {0}")]
    Generative(String),

    /// No generative backend is configured
    #[error("No structured recipe data found and no generative backend is configured")]
    NoGenerativeBackend,

    /// The caller cancelled the request
    #[error("Recipe extraction was cancelled")]
    Cancelled,

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ParseError {
    /// Whether the error was caused by the request itself rather than the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ParseError::InvalidUrl(_))
    }
}
