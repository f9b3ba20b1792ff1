use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use crate::error::ParseError;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self, ParseError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// GET the page and return its body, failing on non-2xx or non-HTML responses.
    pub async fn fetch(&self, url: &str) -> Result<String, ParseError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParseError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !is_html(&content_type) {
            return Err(ParseError::NotHtml(if content_type.is_empty() {
                "no content type".to_string()
            } else {
                content_type
            }));
        }

        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}
