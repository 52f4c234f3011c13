//! Blocking HTTP client for the Quotable random-quote endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::{FetchError, QuoteRecord, QuoteSource};

pub const DEFAULT_QUOTE_URL: &str = "https://api.quotable.io/random";

#[derive(Debug, Clone)]
pub struct QuotableClient {
    client: Client,
    url: String,
}

impl QuotableClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl QuoteSource for QuotableClient {
    fn fetch(&self, tag: Option<&str>) -> Result<QuoteRecord, FetchError> {
        let mut request = self.client.get(&self.url);
        if let Some(tag) = tag {
            request = request.query(&[("tags", tag)]);
        }
        debug!(url = %self.url, ?tag, "requesting quote");
        let body = request.send()?.error_for_status()?.text()?;
        parse_quote(&body)
    }
}

/// Decode a quote payload; both `content` and `author` must be present.
pub fn parse_quote(body: &str) -> Result<QuoteRecord, FetchError> {
    Ok(serde_json::from_str(body)?)
}
