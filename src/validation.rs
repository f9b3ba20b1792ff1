//! Request validation in front of the pipeline entry point.

use serde_json::Value;
use url::Url;

use crate::error::ParseError;

/// Validate the `url` member of a request body such as `{"url": "..."}`.
pub fn validate_request(body: &Value) -> Result<Url, ParseError> {
    match body.get("url") {
        Some(Value::String(url)) if !url.trim().is_empty() => validate_url(url),
        _ => Err(ParseError::InvalidUrl("URL is required".to_string())),
    }
}

/// Parse a URL string, accepting only absolute http(s) URLs.
pub fn validate_url(input: &str) -> Result<Url, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::InvalidUrl("URL is required".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|_| ParseError::InvalidUrl("Invalid URL format".to_string()))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ParseError::InvalidUrl(
            "Invalid URL protocol. Must be http or https.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_urls() {
        let url = validate_url("https://example.com/recipes/soup").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert!(validate_url("  http://localhost:8080/a ").is_ok());
    }

    #[test]
    fn test_invalid_urls() {
        for input in ["", "   ", "not a url", "example.com/recipe"] {
            let err = validate_url(input).unwrap_err();
            assert!(err.is_client_error(), "{input}");
        }

        let err = validate_url("ftp://example.com/recipe").unwrap_err();
        assert!(err.to_string().contains("Must be http or https"));
        let err = validate_url("not a url").unwrap_err();
        assert!(err.to_string().contains("Invalid URL format"));
    }

    #[test]
    fn test_request_body() {
        assert!(validate_request(&json!({"url": "https://example.com"})).is_ok());

        for body in [json!({}), json!({"url": 42}), json!({"url": null}), json!("https://example.com")] {
            let err = validate_request(&body).unwrap_err();
            assert!(err.to_string().contains("URL is required"));
        }
    }
}
